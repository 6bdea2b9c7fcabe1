//! The service that owns the event log.
//!
//! [`SyncHub`] is constructed once and shared by handle (`Arc<SyncHub>`)
//! with every component that needs the log; there is no process-wide
//! global, so tests can run many independent hubs side by side.
//!
//! # Atomicity
//!
//! The log and the push registry sit under one [`RwLock`]. `append` holds
//! the write lock across append, fan-out and the length publish, so two
//! producers are strictly serialized and every observer sees one total
//! order. `subscribe` takes the same write lock for snapshot-and-register,
//! so an event is either in a new subscriber's `INIT` snapshot or in its
//! `DRAW` stream, never both and never neither.
//!
//! Pending polls wait on a [`watch`] channel carrying the log length.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use sketchsync_types::{Event, Offset, SubscriberId};
use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::broadcaster::{PushBroadcaster, PushReceiver};
use crate::log::{Batch, EventLog};

/// State guarded by the hub lock.
#[derive(Debug, Default)]
struct HubState {
    log: EventLog,
    push: PushBroadcaster,
}

/// Outcome of a producer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Log length after the append.
    pub position: usize,
    /// Server receive time minus the event timestamp, in milliseconds.
    pub response_time_ms: i64,
}

/// A registered push subscriber: its id and the channel that yields the
/// `INIT` snapshot followed by every later `DRAW`.
#[derive(Debug)]
pub struct Subscription {
    /// Handle for [`SyncHub::unsubscribe`].
    pub id: SubscriberId,
    /// Ordered message stream for this subscriber.
    pub receiver: PushReceiver,
}

/// Point-in-time counters for the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStats {
    /// Events in the log.
    pub events: usize,
    /// Registered push subscribers.
    pub subscribers: usize,
    /// Poll requests currently suspended.
    pub pending_polls: usize,
}

/// Owner of the single event log and its delivery registries.
#[derive(Debug)]
pub struct SyncHub {
    state: RwLock<HubState>,
    len_tx: watch::Sender<usize>,
    pending_polls: AtomicUsize,
}

impl SyncHub {
    /// Create a hub with an empty log.
    pub fn new() -> Self {
        let (len_tx, _) = watch::channel(0);
        Self {
            state: RwLock::new(HubState::default()),
            len_tx,
            pending_polls: AtomicUsize::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HubState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HubState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event, fan it out to push subscribers and wake pending
    /// long-polls, all as one step. Returns the new length.
    pub fn append(&self, event: Event) -> usize {
        let mut state = self.write();
        let position = state.log.append(event);
        let delivered = state.push.fan_out(event);
        self.len_tx.send_replace(position);
        drop(state);

        trace!(position, delivered, "event appended");
        position
    }

    /// The producer path: append `event` and measure how long it took to
    /// reach the server.
    ///
    /// `received_at_ms` is the server receive time in epoch milliseconds.
    /// The response time is informational and never affects ordering.
    pub fn submit(&self, event: Event, received_at_ms: i64) -> Receipt {
        let response_time_ms = received_at_ms.saturating_sub(event.timestamp);
        let position = self.append(event);
        info!(position, response_time_ms, "draw received");
        Receipt {
            position,
            response_time_ms,
        }
    }

    /// Clamp `raw` against the current length and read everything after it.
    pub fn read_from(&self, raw: i64) -> Batch {
        let state = self.read();
        let offset = state.log.clamp(raw);
        state.log.read_from(offset)
    }

    /// Read everything after an already clamped offset.
    pub fn read_at(&self, offset: Offset) -> Batch {
        self.read().log.read_from(offset)
    }

    /// Current log length.
    pub fn len(&self) -> usize {
        self.read().log.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.read().log.is_empty()
    }

    /// Register a push subscriber. Its first message is the full log.
    pub fn subscribe(&self) -> Subscription {
        let mut state = self.write();
        let snapshot = state.log.snapshot();
        let snapshot_len = snapshot.len();
        let (id, receiver) = state.push.subscribe(snapshot);
        let subscribers = state.push.len();
        drop(state);

        debug!(subscriber = %id, snapshot_len, subscribers, "push subscriber registered");
        Subscription { id, receiver }
    }

    /// Remove a push subscriber. Safe to call more than once.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.write().push.unsubscribe(id);
        if removed {
            debug!(subscriber = %id, "push subscriber removed");
        }
        removed
    }

    /// Watch the log length. The current value is observable immediately.
    pub fn watch_len(&self) -> watch::Receiver<usize> {
        self.len_tx.subscribe()
    }

    /// Counters for monitoring.
    pub fn stats(&self) -> HubStats {
        let state = self.read();
        HubStats {
            events: state.log.len(),
            subscribers: state.push.len(),
            pending_polls: self.pending_polls.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn poll_started(&self) {
        self.pending_polls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn poll_finished(&self) {
        self.pending_polls.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::new()
    }
}
