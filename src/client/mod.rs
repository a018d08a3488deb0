//! The `client` module holds the small WebSocket clients behind the
//! `listen` and `broadcast` subcommands.

use std::io::Write;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::{WebSocketStream, connect_async};
use tracing::info;
use tungstenite::protocol::Message as WsMessage;

use crate::transport::Route;
use crate::utils::TransportError;

fn endpoint(url: &str, route: &Route) -> String {
    format!("{}{}", url.trim_end_matches('/'), route.path())
}

/// Connects to `<url>/listen/<key>` and writes every non-empty frame to
/// `out` as `MSG: <payload>`. Zero-length liveness probes are skipped.
///
/// Returns when the server closes the connection, or after `limit` messages.
pub async fn listen<W: Write>(
    url: &str,
    key: &str,
    limit: Option<usize>,
    out: &mut W,
) -> Result<(), TransportError> {
    let (ws, _) = connect_async(endpoint(url, &Route::Listen(key.to_string()))).await?;
    info!("Connected to {url}, listening on {key}");
    print_messages(ws, limit, out).await
}

pub(crate) async fn print_messages<S, W>(
    ws: WebSocketStream<S>,
    limit: Option<usize>,
    out: &mut W,
) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: Write,
{
    let (mut sink, mut incoming) = ws.split();

    let mut seen = 0usize;
    while limit.is_none_or(|max| seen < max) {
        let Some(frame) = incoming.next().await else {
            break;
        };
        let msg = frame?;
        if msg.is_close() {
            break;
        }
        if !(msg.is_text() || msg.is_binary()) {
            continue;
        }
        let data = msg.into_data();
        if data.is_empty() {
            continue;
        }
        writeln!(out, "MSG: {}", String::from_utf8_lossy(&data))?;
        seen += 1;
    }

    let _ = sink.close().await;
    Ok(())
}

/// Publishes one text payload to `<url>/broadcast/<key>`.
pub async fn broadcast(url: &str, key: &str, payload: &str) -> Result<(), TransportError> {
    let (mut ws, _) =
        connect_async(endpoint(url, &Route::Broadcast(key.to_string()))).await?;
    ws.send(WsMessage::text(payload.to_string())).await?;
    ws.close(None).await?;
    Ok(())
}

#[cfg(test)]
mod tests;
