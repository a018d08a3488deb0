//! The hub: topic membership, routing and liveness.
//!
//! - `registry`: topic key to live subscribers
//! - `channel`: per-subscriber delivery queue
//! - `engine`: the hub loop and its [`HubHandle`]
//! - `sweeper`: periodic liveness trigger

pub mod channel;
pub mod engine;
pub mod event;
pub mod registry;
pub mod sweeper;

pub use channel::{Subscriber, SubscriberId};
pub use engine::{Hub, HubHandle};
pub use sweeper::run_sweeper;
