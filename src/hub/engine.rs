//! Hub engine
//!
//! The hub loop is the only code that reads or writes the subscription
//! registry. Everything else talks to it through [`HubHandle`], which feeds
//! four queues: publish, subscribe, unsubscribe and sweep. The loop takes one
//! event at a time from whichever queue is ready, so registry access needs no
//! locking.
//!
//! Delivery notes:
//! - A publish or sweep enqueues onto each subscriber's channel in turn. With
//!   no enqueue timeout configured, a subscriber whose servicer stops draining
//!   holds up the rest of that pass until it makes room.
//! - With `enqueue_timeout_ms` set, such a subscriber is evicted instead.
//! - A subscriber whose receiving end is gone is evicted on the next enqueue.
//! - Evictions found during a pass are applied after the pass.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::HubSettings;
use crate::hub::channel::{Subscriber, SubscriberId, delivery_channel};
use crate::hub::event::{Publish, Subscribe, Sweep, Unsubscribe};
use crate::hub::registry::Registry;
use crate::utils::HubError;

#[derive(Debug)]
pub struct Hub {
    registry: Registry,
    pubs: mpsc::Receiver<Publish>,
    subs: mpsc::Receiver<Subscribe>,
    rubs: mpsc::Receiver<Unsubscribe>,
    sweeps: mpsc::Receiver<Sweep>,
    enqueue_timeout: Option<Duration>,
}

impl Hub {
    /// Creates the hub loop state together with the handle used to feed it.
    /// The loop does nothing until [`Hub::run`] is awaited.
    pub fn new(settings: &HubSettings) -> (Self, HubHandle) {
        let (pubs_tx, pubs) = mpsc::channel(settings.event_capacity);
        let (subs_tx, subs) = mpsc::channel(settings.event_capacity);
        let (rubs_tx, rubs) = mpsc::channel(settings.event_capacity);
        let (sweeps_tx, sweeps) = mpsc::channel(settings.event_capacity);

        let hub = Self {
            registry: Registry::new(),
            pubs,
            subs,
            rubs,
            sweeps,
            enqueue_timeout: settings.enqueue_timeout(),
        };
        let handle = HubHandle {
            pubs: pubs_tx,
            subs: subs_tx,
            rubs: rubs_tx,
            sweeps: sweeps_tx,
            delivery_capacity: settings.delivery_capacity,
        };
        (hub, handle)
    }

    /// Creates the hub and runs its loop on a new task.
    pub fn spawn(settings: &HubSettings) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(settings);
        (handle, tokio::spawn(hub.run()))
    }

    /// Runs the loop until every [`HubHandle`] has been dropped. Remaining
    /// delivery channels close when the registry is dropped on return.
    pub async fn run(mut self) {
        info!("Hub loop started");
        loop {
            tokio::select! {
                Some(publish) = self.pubs.recv() => self.publish(publish).await,
                Some(subscribe) = self.subs.recv() => self.subscribe(subscribe),
                Some(unsubscribe) = self.rubs.recv() => {
                    self.remove(&unsubscribe.key, &unsubscribe.id);
                }
                Some(Sweep) = self.sweeps.recv() => self.sweep().await,
                else => break,
            }
        }
        info!(
            subscribers = self.registry.subscriber_count(),
            "Hub loop stopped"
        );
    }

    async fn publish(&mut self, publish: Publish) {
        let Publish { key, payload } = publish;
        let mut evicted = Vec::new();
        let mut delivered = 0usize;

        for entry in self.registry.subscribers(&key) {
            match entry.deliver(payload.clone(), self.enqueue_timeout).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(topic = %key, subscriber = %entry.id(), "Evicting subscriber: {e}");
                    evicted.push(entry.id());
                }
            }
        }
        debug!(topic = %key, delivered, bytes = payload.len(), "Routed message");

        for id in evicted {
            self.remove(&key, &id);
        }
    }

    fn subscribe(&mut self, subscribe: Subscribe) {
        let Subscribe { entry, registered } = subscribe;
        let key = entry.key().to_string();
        let id = entry.id();
        self.registry.insert(entry);
        info!(topic = %key, subscriber = %id, "Got subscriber");

        // the caller gave up before registration finished; nobody will read
        if registered.send(()).is_err() {
            self.remove(&key, &id);
        }
    }

    fn remove(&mut self, key: &str, id: &SubscriberId) {
        match self.registry.remove(key, id) {
            Some(entry) => {
                // dropping the only sender closes the delivery channel
                drop(entry);
                info!(topic = %key, subscriber = %id, "Removed subscriber");
            }
            None => debug!(topic = %key, subscriber = %id, "Subscriber already removed"),
        }
    }

    async fn sweep(&mut self) {
        debug!(
            subscribers = self.registry.subscriber_count(),
            "Running liveness sweep"
        );
        let mut evicted = Vec::new();

        for entry in self.registry.all() {
            if let Err(e) = entry.deliver(Bytes::new(), self.enqueue_timeout).await {
                warn!(topic = %entry.key(), subscriber = %entry.id(), "Evicting subscriber: {e}");
                evicted.push((entry.key().to_string(), entry.id()));
            }
        }

        for (key, id) in evicted {
            self.remove(&key, &id);
        }
    }
}

/// Cloneable front door to a running hub loop.
///
/// Every method returns [`HubError::Closed`] once the loop has stopped.
#[derive(Debug, Clone)]
pub struct HubHandle {
    pubs: mpsc::Sender<Publish>,
    subs: mpsc::Sender<Subscribe>,
    rubs: mpsc::Sender<Unsubscribe>,
    sweeps: mpsc::Sender<Sweep>,
    delivery_capacity: usize,
}

impl HubHandle {
    /// Hands a payload to the hub for fan-out. Returns once the hub has
    /// accepted the event; publishing to a topic nobody follows is not an error.
    pub async fn publish(
        &self,
        key: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Result<(), HubError> {
        self.pubs
            .send(Publish {
                key: key.into(),
                payload: payload.into(),
            })
            .await
            .map_err(|_| HubError::Closed)
    }

    /// Registers a new subscriber for `key` and returns its receiving end.
    ///
    /// Returns only after the hub has added it to the registry, so payloads
    /// published afterwards reach it and earlier ones never do.
    pub async fn subscribe(&self, key: impl Into<String>) -> Result<Subscriber, HubError> {
        let (entry, subscriber) = delivery_channel(key.into(), self.delivery_capacity);
        let (registered, ack) = oneshot::channel();
        self.subs
            .send(Subscribe { entry, registered })
            .await
            .map_err(|_| HubError::Closed)?;
        ack.await.map_err(|_| HubError::Closed)?;
        Ok(subscriber)
    }

    /// Reports a subscriber as gone. Safe to call more than once.
    ///
    /// The receiving side is closed first, so a hub loop waiting for room in
    /// this subscriber's channel gives up on it instead of waiting for a
    /// reader that is never coming back.
    pub async fn unsubscribe(&self, subscriber: &mut Subscriber) -> Result<(), HubError> {
        subscriber.close();
        self.rubs
            .send(Unsubscribe {
                key: subscriber.key().to_string(),
                id: subscriber.id(),
            })
            .await
            .map_err(|_| HubError::Closed)
    }

    /// Asks the hub to probe every subscriber with a zero-length payload.
    pub async fn sweep(&self) -> Result<(), HubError> {
        self.sweeps.send(Sweep).await.map_err(|_| HubError::Closed)
    }
}
