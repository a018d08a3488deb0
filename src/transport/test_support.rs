//! Helpers shared by tests that talk to a real server.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tungstenite::protocol::Message as WsMessage;

use crate::config::HubSettings;
use crate::hub::{Hub, HubHandle};
use crate::transport::{Route, serve};

pub(crate) type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub(crate) async fn setup_server() -> (String, HubHandle) {
    let (hub, _) = Hub::spawn(&HubSettings::default());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, hub.clone()));
    (format!("ws://{addr}"), hub)
}

pub(crate) async fn connect(base: &str, route: Route) -> Client {
    let (ws, _) = connect_async(format!("{base}{}", route.path()))
        .await
        .expect("WebSocket handshake failed");
    ws
}

/// Sweeps until `ws` sees a probe, which means its subscription is live.
/// More probes may already be on their way when this returns.
pub(crate) async fn await_registration(ws: &mut Client, hub: &HubHandle) {
    timeout(Duration::from_secs(5), async {
        loop {
            hub.sweep().await.expect("hub stopped");
            if let Ok(Some(Ok(frame))) = timeout(Duration::from_millis(50), ws.next()).await {
                if frame.is_binary() && frame.is_empty() {
                    return;
                }
            }
        }
    })
    .await
    .expect("listener was never registered");
}

/// Connects to `/listen/<key>` and waits until the hub has registered it.
pub(crate) async fn listen(base: &str, hub: &HubHandle, key: &str) -> Client {
    let mut ws = connect(base, Route::Listen(key.to_string())).await;
    await_registration(&mut ws, hub).await;
    ws
}

pub(crate) async fn next_frame(ws: &mut Client) -> WsMessage {
    timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for frame")
        .expect("connection closed")
        .expect("read failed")
}

/// Next non-empty frame, skipping liveness probes.
pub(crate) async fn next_payload(ws: &mut Client) -> WsMessage {
    loop {
        let frame = next_frame(ws).await;
        if !frame.is_empty() {
            return frame;
        }
    }
}
