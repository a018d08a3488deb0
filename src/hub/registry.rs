//! Subscription registry
//!
//! Maps a topic key to the delivery senders of its live subscribers. The
//! registry does no synchronization of its own; the hub loop is its only
//! reader and writer.

use std::collections::HashMap;

use crate::hub::channel::{DeliverySender, SubscriberId};

#[derive(Debug, Default)]
pub struct Registry {
    topics: HashMap<String, HashMap<SubscriberId, DeliverySender>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            topics: HashMap::new(),
        }
    }

    /// Add a subscriber under its own key. Creates the topic if needed.
    pub fn insert(&mut self, entry: DeliverySender) {
        self.topics
            .entry(entry.key().to_string())
            .or_default()
            .insert(entry.id(), entry);
    }

    /// Remove a subscriber, handing back its sender so the caller decides
    /// when the channel closes. Empty topics are dropped.
    pub fn remove(&mut self, key: &str, id: &SubscriberId) -> Option<DeliverySender> {
        let subscribers = self.topics.get_mut(key)?;
        let removed = subscribers.remove(id);
        if subscribers.is_empty() {
            self.topics.remove(key);
        }
        removed
    }

    /// Live subscribers of one topic.
    pub fn subscribers<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = &'a DeliverySender> + use<'a> {
        self.topics.get(key).into_iter().flat_map(|s| s.values())
    }

    /// Every live subscriber across all topics.
    pub fn all(&self) -> impl Iterator<Item = &DeliverySender> {
        self.topics.values().flat_map(|s| s.values())
    }

    pub fn contains(&self, key: &str, id: &SubscriberId) -> bool {
        self.topics.get(key).is_some_and(|s| s.contains_key(id))
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.topics.values().map(HashMap::len).sum()
    }
}
