//! # Brolly
//!
//! `brolly` is a topic-keyed broadcast hub. Publishers push byte payloads
//! tagged with a key; subscribers hold long-lived connections for a key and
//! receive every payload published to it after they subscribed.
//!
//! ## Core Modules
//!
//! - `hub`: the hub loop that owns topic membership, routes payloads and
//!   evicts dead subscribers, plus the liveness sweeper.
//! - `transport`: WebSocket server feeding publishers and subscribers into the hub.
//! - `client`: minimal `listen` / `broadcast` clients.
//! - `config`: layered configuration loading.
//! - `utils`: error types and logging setup.

pub mod client;
pub mod config;
pub mod hub;
pub mod transport;
pub mod utils;
