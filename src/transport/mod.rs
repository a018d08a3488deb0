//! The `transport` module connects the hub to the network over WebSockets.
//!
//! Publishers and subscribers pick their role and topic key through the
//! handshake path; see [`route::Route`]. Publishing is frame based: a
//! publisher opens `/broadcast/<key>` and sends text or binary frames. Plain
//! HTTP `POST` requests are not accepted.

pub mod route;
pub mod websocket;

pub use route::Route;
pub use websocket::{serve, start_websocket_server};

#[cfg(test)]
pub(crate) mod test_support;
