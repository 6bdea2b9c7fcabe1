//! HTTP and `WebSocket` surface for sketchsync.
//!
//! This crate exposes the event log owned by a
//! [`SyncHub`](sketchsync_core::SyncHub) through three delivery protocols
//! and one producer endpoint:
//!
//! - **Push** (`GET /ws`, also `GET /` for plain `ws://host:port` clients):
//!   one `INIT` frame with the full log, then one `DRAW` frame per append
//! - **Long-poll** (`GET /long-poll?lastUpdate=N`)
//! - **Adaptive-poll** (`GET /adaptive-poll?lastUpdate=N`)
//! - **Submission** (`POST /draw`), plus `DRAW` frames sent over the socket
//!
//! `GET /api/status` reports log length, subscriber count and suspended
//! polls.
//!
//! # Architecture
//!
//! Handlers hold no state of their own. Everything goes through the shared
//! [`AppState`], which carries the hub handle, the clock and the two poll
//! responders. A poll whose client disconnects is dropped together with
//! the handler future.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve};
pub use startup::{StartupError, spawn_server};
pub use state::AppState;
