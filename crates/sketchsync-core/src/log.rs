//! The append-only, globally ordered draw-event log.
//!
//! The log is never mutated in place or truncated: `len` only grows and the
//! event at position `i` never changes once appended. Ordering is append
//! order; event timestamps play no part in it.

use sketchsync_types::{Event, Offset, PollResponse};

/// Ordered, append-only sequence of [`Event`]s.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event and return the new length.
    pub fn append(&mut self, event: Event) -> usize {
        self.events.push(event);
        self.events.len()
    }

    /// All events at positions `>= offset`, in append order.
    ///
    /// Empty when `offset >= len`.
    pub fn slice(&self, offset: Offset) -> &[Event] {
        self.events.get(offset.get()..).unwrap_or(&[])
    }

    /// Current number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clamp a client-supplied offset against the current length.
    pub fn clamp(&self, raw: i64) -> Offset {
        Offset::clamp(raw, self.len())
    }

    /// Copy out everything after `offset` together with the length it was
    /// read at.
    pub fn read_from(&self, offset: Offset) -> Batch {
        let start = offset.min(Offset(self.len()));
        Batch {
            events: self.slice(start).to_vec(),
            start,
            next: Offset(self.len()),
        }
    }

    /// Copy of the whole log.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }
}

/// A consistent read of the log tail: the events after `start` and the
/// offset the consumer should resume from.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Events at positions `[start, next)`.
    pub events: Vec<Event>,
    /// The clamped offset the read started at.
    pub start: Offset,
    /// The log length at read time.
    pub next: Offset,
}

impl Batch {
    /// A batch carrying nothing, resuming at the same offset.
    pub const fn empty(offset: Offset) -> Self {
        Self {
            events: Vec::new(),
            start: offset,
            next: offset,
        }
    }

    /// Whether the consumer was already caught up.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl From<Batch> for PollResponse {
    fn from(batch: Batch) -> Self {
        Self {
            data: batch.events,
            last_update: batch.next,
        }
    }
}
