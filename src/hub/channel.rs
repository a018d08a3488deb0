//! Delivery channels
//!
//! Each subscriber gets one bounded FIFO queue. The hub keeps the write side
//! ([`DeliverySender`]) inside the registry and is the only owner of it, so
//! dropping the registry entry is the single point where the channel closes.
//! The read side ([`Subscriber`]) goes to whoever services the connection.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TryRecvError};
use uuid::Uuid;

use crate::utils::DeliveryError;

pub type SubscriberId = Uuid;

/// Creates a fresh subscriber identity and both ends of its delivery channel.
pub fn delivery_channel(key: String, capacity: usize) -> (DeliverySender, Subscriber) {
    let (tx, rx) = mpsc::channel(capacity);
    let id = Uuid::new_v4();
    (
        DeliverySender {
            id,
            key: key.clone(),
            sender: tx,
        },
        Subscriber {
            id,
            key,
            receiver: rx,
        },
    )
}

/// Hub-side end of a delivery channel.
#[derive(Debug)]
pub struct DeliverySender {
    id: SubscriberId,
    key: String,
    sender: mpsc::Sender<Bytes>,
}

impl DeliverySender {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Enqueue one payload, waiting for room in the queue.
    ///
    /// Without a timeout this waits until the servicer makes room.
    pub async fn deliver(
        &self,
        payload: Bytes,
        timeout: Option<Duration>,
    ) -> Result<(), DeliveryError> {
        match timeout {
            None => self
                .sender
                .send(payload)
                .await
                .map_err(|_| DeliveryError::Closed),
            Some(limit) => self
                .sender
                .send_timeout(payload, limit)
                .await
                .map_err(|e| match e {
                    SendTimeoutError::Timeout(_) => DeliveryError::TimedOut,
                    SendTimeoutError::Closed(_) => DeliveryError::Closed,
                }),
        }
    }
}

/// Servicer-side end of a delivery channel.
///
/// Yields every payload routed to this subscriber in the order the hub
/// enqueued it; zero-length payloads are liveness probes.
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    key: String,
    receiver: mpsc::Receiver<Bytes>,
}

impl Subscriber {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits for the next payload. `None` means the hub closed the channel
    /// and everything queued before the close has been drained.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.receiver.recv().await
    }

    /// Non-blocking variant of [`Subscriber::recv`].
    pub fn try_recv(&mut self) -> Result<Bytes, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Stops accepting payloads. Anything already queued can still be
    /// received, and an enqueue waiting for room fails at once.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// True once the channel is closed, even if payloads remain queued.
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}
