//! Events accepted by the hub loop
//!
//! Each kind travels on its own queue; the loop services whichever queue is
//! ready.

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::hub::channel::{DeliverySender, SubscriberId};

/// A payload to fan out to every current subscriber of `key`.
#[derive(Debug, Clone)]
pub struct Publish {
    pub key: String,
    pub payload: Bytes,
}

/// A new subscriber. `registered` fires once it is in the registry.
#[derive(Debug)]
pub struct Subscribe {
    pub entry: DeliverySender,
    pub registered: oneshot::Sender<()>,
}

#[derive(Debug, Clone)]
pub struct Unsubscribe {
    pub key: String,
    pub id: SubscriberId,
}

/// Request to probe every subscriber with a zero-length payload.
#[derive(Debug, Clone, Copy)]
pub struct Sweep;
