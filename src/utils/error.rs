//! The `error` module defines the error types used within `brolly`.
//!
//! Failures that concern a single subscriber are resolved inside the hub by
//! eviction and never reach publishers. Only a stopped hub loop or a
//! transport-level failure is visible to callers.

use thiserror::Error;

/// Returned by [`crate::hub::HubHandle`] when the hub loop is no longer running.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    #[error("hub loop has shut down")]
    Closed,
}

/// Outcome of a failed enqueue onto a subscriber's delivery channel.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The servicer dropped its end of the channel.
    #[error("subscriber is no longer receiving")]
    Closed,

    /// The channel stayed full for longer than the configured enqueue timeout.
    #[error("subscriber did not accept the payload in time")]
    TimedOut,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error(transparent)]
    Hub(#[from] HubError),
}
