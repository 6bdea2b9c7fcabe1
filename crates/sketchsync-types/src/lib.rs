//! Shared wire types for sketchsync.
//!
//! Every payload that crosses the push channel or the poll endpoints is
//! defined here. Types flow downstream to `TypeScript` via `ts-rs` for the
//! drawing client.
//!
//! # Modules
//!
//! - [`event`] -- The draw event and the consumer offset
//! - [`ids`] -- Push subscriber identifiers
//! - [`messages`] -- Request/response bodies for push, poll and submission

pub mod event;
pub mod ids;
pub mod messages;

pub use event::{Event, Offset};
pub use ids::SubscriberId;
pub use messages::{DrawRequest, DrawResponse, DrawStatus, PollQuery, PollResponse, PushMessage};
