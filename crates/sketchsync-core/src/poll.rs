//! A suspended poll request.
//!
//! A [`PendingPoll`] exists from the moment a poll decides to wait until it
//! resolves. It is a drop guard: whichever way the wait ends (data, timer,
//! or the request future being dropped because the client went away) the
//! hub's pending counter is decremented exactly once. A dropped request has
//! no socket left to write to, so nothing is sent and nothing is reported
//! as an error.

use std::time::Duration;

use sketchsync_types::Offset;
use tokio::time::Instant;

use crate::hub::SyncHub;

/// Bookkeeping for one waiting poll.
#[derive(Debug)]
pub struct PendingPoll<'a> {
    hub: &'a SyncHub,
    offset: Offset,
    connected_at: Instant,
}

impl<'a> PendingPoll<'a> {
    /// Mark a poll for `offset` as waiting on `hub`.
    pub fn register(hub: &'a SyncHub, offset: Offset) -> Self {
        hub.poll_started();
        Self {
            hub,
            offset,
            connected_at: Instant::now(),
        }
    }

    /// The offset the client asked from.
    pub const fn offset(&self) -> Offset {
        self.offset
    }

    /// Time spent waiting so far.
    pub fn waited(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl Drop for PendingPoll<'_> {
    fn drop(&mut self) {
        self.hub.poll_finished();
    }
}
