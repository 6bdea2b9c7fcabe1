//! Shared application state for the HTTP layer.

use std::sync::Arc;

use sketchsync_core::config::SyncConfig;
use sketchsync_core::{AdaptivePollResponder, Clock, LongPollResponder, SyncHub, SystemClock};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The hub
/// is the only mutable state; the responders hold handles to it.
#[derive(Clone)]
pub struct AppState {
    /// Owner of the event log.
    pub hub: Arc<SyncHub>,
    /// Wall clock for response-time measurement and poll timers.
    pub clock: Arc<dyn Clock>,
    /// Long-poll delivery.
    pub long_poll: LongPollResponder,
    /// Adaptive-poll delivery.
    pub adaptive_poll: AdaptivePollResponder,
}

impl AppState {
    /// Wire the responders to `hub` using the timings in `config`.
    pub fn new(hub: Arc<SyncHub>, clock: Arc<dyn Clock>, config: &SyncConfig) -> Self {
        let long_poll =
            LongPollResponder::from_config(Arc::clone(&hub), Arc::clone(&clock), &config.long_poll);
        let adaptive_poll = AdaptivePollResponder::from_config(
            Arc::clone(&hub),
            Arc::clone(&clock),
            &config.adaptive_poll,
        );
        Self {
            hub,
            clock,
            long_poll,
            adaptive_poll,
        }
    }

    /// A fresh hub on the system clock with default timings.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(SyncHub::new()),
            Arc::new(SystemClock),
            &SyncConfig::default(),
        )
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_defaults()
    }
}
