//! Event-log synchronization core for sketchsync.
//!
//! A single append-only [`EventLog`] is owned by a [`SyncHub`]. Producers
//! append through the hub; consumers only ever see the log through an
//! offset cursor, delivered by one of three strategies:
//!
//! - [`PushBroadcaster`] -- snapshot on subscribe, then synchronous fan-out
//!   of every appended event
//! - [`LongPollResponder`] -- hold the request until data arrives or a
//!   ceiling timeout elapses
//! - [`AdaptivePollResponder`] -- fixed delay chosen at arrival from
//!   whether the client is already behind
//!
//! All waiting goes through the [`Clock`] trait so the chosen delays can be
//! observed in tests.

pub mod adaptive;
pub mod broadcaster;
pub mod clock;
pub mod config;
pub mod hub;
pub mod log;
pub mod long_poll;
pub mod poll;

pub use adaptive::{AdaptivePollResponder, Pace};
pub use broadcaster::{PushBroadcaster, PushReceiver};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, SyncConfig};
pub use hub::{HubStats, Receipt, Subscription, SyncHub};
pub use log::{Batch, EventLog};
pub use long_poll::LongPollResponder;
pub use poll::PendingPoll;
