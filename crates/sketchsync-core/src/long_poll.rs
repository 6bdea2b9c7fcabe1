//! Long-poll delivery: reply at once if the client is behind, otherwise
//! hold the request until new data arrives or the ceiling elapses.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::config::LongPollConfig;
use crate::hub::SyncHub;
use crate::log::Batch;
use crate::poll::PendingPoll;

/// Answers long-poll requests against a shared hub.
#[derive(Clone)]
pub struct LongPollResponder {
    hub: Arc<SyncHub>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl LongPollResponder {
    /// Create a responder with an explicit ceiling.
    pub fn new(hub: Arc<SyncHub>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            hub,
            clock,
            timeout,
        }
    }

    /// Create a responder from configuration.
    pub fn from_config(hub: Arc<SyncHub>, clock: Arc<dyn Clock>, config: &LongPollConfig) -> Self {
        Self::new(hub, clock, config.timeout())
    }

    /// The ceiling wait.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve one request with client offset `raw_offset`.
    ///
    /// Exactly one of the data trigger and the timer resolves a waiting
    /// request; the loser is dropped with the `select!`. On timeout the
    /// batch is empty and `next` equals the (clamped) request offset.
    pub async fn respond(&self, raw_offset: i64) -> Batch {
        // Subscribe before reading so an append between the read and the
        // wait still wakes us.
        let mut len_rx = self.hub.watch_len();
        let arrival = self.hub.read_from(raw_offset);
        if !arrival.is_empty() {
            return arrival;
        }

        let offset = arrival.start;
        let pending = PendingPoll::register(&self.hub, offset);

        let woke = tokio::select! {
            biased;
            changed = len_rx.wait_for(|len| *len > offset.get()) => changed.is_ok(),
            () = self.clock.sleep(self.timeout) => false,
        };

        if woke {
            let batch = self.hub.read_at(offset);
            debug!(
                offset = %pending.offset(),
                next = %batch.next,
                waited_ms = pending.waited().as_millis(),
                "long-poll woke on new data"
            );
            batch
        } else {
            debug!(offset = %pending.offset(), "long-poll timed out");
            Batch::empty(offset)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use sketchsync_types::{Event, Offset};

    use super::*;
    use crate::clock::FakeClock;

    fn event(t: i64) -> Event {
        Event {
            x: t as f64,
            y: 0.0,
            timestamp: t,
        }
    }

    fn responder(hub: &Arc<SyncHub>, clock: &FakeClock) -> LongPollResponder {
        LongPollResponder::new(
            Arc::clone(hub),
            Arc::new(clock.clone()),
            Duration::from_millis(3000),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn behind_client_is_answered_immediately() {
        let hub = Arc::new(SyncHub::new());
        for t in 0..5 {
            hub.append(event(t));
        }
        let clock = FakeClock::at(0);

        let batch = responder(&hub, &clock).respond(2).await;

        let stamps: Vec<i64> = batch.events.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![2, 3, 4]);
        assert_eq!(batch.next, Offset(5));
        assert!(clock.scheduled().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_request_times_out_empty() {
        let hub = Arc::new(SyncHub::new());
        hub.append(event(0));
        let clock = FakeClock::at(0);
        let started = tokio::time::Instant::now();

        let batch = responder(&hub, &clock).respond(1).await;

        assert!(batch.is_empty());
        assert_eq!(batch.next, Offset(1));
        assert_eq!(clock.scheduled(), vec![Duration::from_millis(3000)]);
        assert!(started.elapsed() >= Duration::from_millis(3000));
        assert_eq!(hub.stats().pending_polls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn offset_past_end_times_out_at_len() {
        let hub = Arc::new(SyncHub::new());
        hub.append(event(0));
        let clock = FakeClock::at(0);

        let batch = responder(&hub, &clock).respond(99).await;

        assert!(batch.is_empty());
        assert_eq!(batch.next, Offset(1));
    }

    #[tokio::test(start_paused = true)]
    async fn append_wakes_waiting_request_early() {
        let hub = Arc::new(SyncHub::new());
        let clock = FakeClock::at(0);
        let poll = responder(&hub, &clock);

        let waiter = tokio::spawn(async move { poll.respond(0).await });
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hub.stats().pending_polls, 1);

        let started = tokio::time::Instant::now();
        hub.append(event(7));
        let batch = waiter.await.unwrap();

        assert_eq!(batch.events, vec![event(7)]);
        assert_eq!(batch.next, Offset(1));
        assert!(started.elapsed() < Duration::from_millis(3000));
        assert_eq!(hub.stats().pending_polls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_request_releases_pending_slot() {
        let hub = Arc::new(SyncHub::new());
        let clock = FakeClock::at(0);
        let poll = responder(&hub, &clock);

        let waiter = tokio::spawn(async move { poll.respond(0).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(hub.stats().pending_polls, 1);

        waiter.abort();
        let _ = waiter.await;
        assert_eq!(hub.stats().pending_polls, 0);

        // The log is untouched and later appends do not fail.
        assert_eq!(hub.append(event(1)), 1);
    }
}
