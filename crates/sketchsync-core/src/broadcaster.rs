//! Registry of live push subscribers and synchronous fan-out.
//!
//! Each subscriber owns an unbounded channel. Sends never block, so fan-out
//! runs inside the hub's append critical section and every subscriber sees
//! events in log order with no gaps. A subscriber whose receiving half is
//! gone (connection closed) is dropped during the fan-out that notices it;
//! the failure never reaches other subscribers or the producer.
//!
//! The registry has no lock of its own. [`SyncHub`](crate::SyncHub) keeps it
//! beside the log under one lock so snapshot-and-register is atomic with
//! respect to appends.

use std::collections::BTreeMap;

use sketchsync_types::{Event, PushMessage, SubscriberId};
use tokio::sync::mpsc;
use tracing::debug;

/// Receiving half handed to a push connection.
pub type PushReceiver = mpsc::UnboundedReceiver<PushMessage>;

/// Live push subscribers keyed by id.
#[derive(Debug, Default)]
pub struct PushBroadcaster {
    subscribers: BTreeMap<SubscriberId, mpsc::UnboundedSender<PushMessage>>,
}

impl PushBroadcaster {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            subscribers: BTreeMap::new(),
        }
    }

    /// Register a subscriber and queue its `INIT` snapshot as the first
    /// message on its channel.
    pub fn subscribe(&mut self, snapshot: Vec<Event>) -> (SubscriberId, PushReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriberId::new();
        // rx is alive in this scope, so the send cannot fail.
        let _ = tx.send(PushMessage::Init(snapshot));
        self.subscribers.insert(id, tx);
        (id, rx)
    }

    /// Forward `event` to every open subscriber, dropping closed ones.
    ///
    /// Returns the number of subscribers that accepted the event.
    pub fn fan_out(&mut self, event: Event) -> usize {
        let mut delivered: usize = 0;
        self.subscribers.retain(|id, tx| {
            if tx.send(PushMessage::Draw(event)).is_ok() {
                delivered = delivered.saturating_add(1);
                true
            } else {
                debug!(subscriber = %id, "push subscriber closed, removing");
                false
            }
        });
        delivered
    }

    /// Remove a subscriber. Returns whether it was still registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
