//! WebSocket transport
//!
//! Turns network connections into hub calls:
//! - `/listen/<key>` connections subscribe and are serviced by a task that
//!   drains the subscriber's delivery channel into binary frames
//! - `/broadcast/<key>` connections publish every text or binary frame
//! - any other path is refused during the handshake
//!
//! A servicer that fails to write, or whose peer goes away, reports its
//! subscriber to the hub and stops reading from the delivery channel.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};
use tracing::{debug, error, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message as WsMessage;

use crate::hub::HubHandle;
use crate::transport::route::Route;
use crate::utils::TransportError;

/// Binds `addr` and serves connections until accepting fails.
pub async fn start_websocket_server(addr: &str, hub: HubHandle) -> Result<(), TransportError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| TransportError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    serve(listener, hub).await
}

/// Serves connections from an already bound listener.
pub async fn serve(listener: TcpListener, hub: HubHandle) -> Result<(), TransportError> {
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        let hub = hub.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, hub).await {
                warn!(%peer, "Connection failed: {e}");
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, hub: HubHandle) -> Result<(), TransportError> {
    let mut route = None;
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        match Route::parse(req.uri().path()) {
            Some(r) => {
                route = Some(r);
                Ok(resp)
            }
            None => {
                let mut refusal = ErrorResponse::new(Some(format!(
                    "no route for {}",
                    req.uri().path()
                )));
                *refusal.status_mut() = StatusCode::NOT_FOUND;
                Err(refusal)
            }
        }
    };
    let ws = accept_hdr_async(stream, callback).await?;

    match route {
        Some(Route::Listen(key)) => {
            let (sink, incoming) = ws.split();
            service_subscriber(sink, incoming, hub, key).await
        }
        Some(Route::Broadcast(key)) => accept_publishes(ws, hub, key).await,
        // the callback refuses the handshake when no route matched
        None => Ok(()),
    }
}

/// Drains one subscriber's delivery channel into `sink` until the channel
/// closes, a write fails, or the peer goes away.
pub(crate) async fn service_subscriber<S, R>(
    mut sink: S,
    mut incoming: R,
    hub: HubHandle,
    key: String,
) -> Result<(), TransportError>
where
    S: Sink<WsMessage, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    let mut subscriber = hub.subscribe(key).await?;

    loop {
        tokio::select! {
            next = subscriber.recv() => match next {
                Some(payload) => {
                    if let Err(e) = sink.send(WsMessage::Binary(payload)).await {
                        warn!(topic = %subscriber.key(), "Dropping subscription: {e}");
                        hub.unsubscribe(&mut subscriber).await?;
                        return Ok(());
                    }
                }
                None => {
                    debug!(topic = %subscriber.key(), "Delivery channel closed");
                    let _ = sink.close().await;
                    return Ok(());
                }
            },
            frame = incoming.next() => match frame {
                Some(Ok(WsMessage::Close(_))) | None => {
                    debug!(topic = %subscriber.key(), "Subscriber disconnected");
                    hub.unsubscribe(&mut subscriber).await?;
                    return Ok(());
                }
                Some(Err(e)) => {
                    warn!(topic = %subscriber.key(), "Dropping subscription: {e}");
                    hub.unsubscribe(&mut subscriber).await?;
                    return Ok(());
                }
                // listeners have nothing to say; pings are answered by tungstenite
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn accept_publishes(
    ws: WebSocketStream<TcpStream>,
    hub: HubHandle,
    key: String,
) -> Result<(), TransportError> {
    let (_, mut incoming) = ws.split();

    while let Some(frame) = incoming.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                warn!(topic = %key, "Publisher connection failed: {e}");
                break;
            }
        };
        if msg.is_text() || msg.is_binary() {
            debug!(topic = %key, "Got message");
            if let Err(e) = hub.publish(key.clone(), msg.into_data()).await {
                error!(topic = %key, "Could not hand message to hub: {e}");
                return Err(e.into());
            }
        } else if msg.is_close() {
            break;
        }
    }

    Ok(())
}
