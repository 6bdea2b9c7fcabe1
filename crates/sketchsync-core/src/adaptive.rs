//! Adaptive-interval polling.
//!
//! The wait is chosen once, at arrival: a client that is already behind is
//! paced with the short active delay, a caught-up client backs off with the
//! long idle delay. Unlike long-poll, an append during the wait does not
//! wake the request early; it fires on the timer and returns whatever the
//! log holds at that moment. Slice and `next` come from the same read at
//! fire time, so nothing appended during the wait is skipped.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::config::AdaptivePollConfig;
use crate::hub::SyncHub;
use crate::log::Batch;
use crate::poll::PendingPoll;

/// Which delay a request was assigned at arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Events were already waiting: short pacing delay.
    Active,
    /// Nothing new: long backoff delay.
    Idle,
}

/// Answers adaptive-poll requests against a shared hub.
#[derive(Clone)]
pub struct AdaptivePollResponder {
    hub: Arc<SyncHub>,
    clock: Arc<dyn Clock>,
    active_delay: Duration,
    idle_delay: Duration,
}

impl AdaptivePollResponder {
    /// Create a responder with explicit delays.
    pub fn new(
        hub: Arc<SyncHub>,
        clock: Arc<dyn Clock>,
        active_delay: Duration,
        idle_delay: Duration,
    ) -> Self {
        Self {
            hub,
            clock,
            active_delay,
            idle_delay,
        }
    }

    /// Create a responder from configuration.
    pub fn from_config(
        hub: Arc<SyncHub>,
        clock: Arc<dyn Clock>,
        config: &AdaptivePollConfig,
    ) -> Self {
        Self::new(hub, clock, config.active_delay(), config.idle_delay())
    }

    /// Classify a request from what was readable at arrival.
    pub fn pace_for(arrival: &Batch) -> Pace {
        if arrival.is_empty() {
            Pace::Idle
        } else {
            Pace::Active
        }
    }

    /// The delay scheduled for `pace`.
    pub const fn delay(&self, pace: Pace) -> Duration {
        match pace {
            Pace::Active => self.active_delay,
            Pace::Idle => self.idle_delay,
        }
    }

    /// Resolve one request with client offset `raw_offset`.
    pub async fn respond(&self, raw_offset: i64) -> Batch {
        let arrival = self.hub.read_from(raw_offset);
        let pace = Self::pace_for(&arrival);
        let delay = self.delay(pace);
        let offset = arrival.start;

        let pending = PendingPoll::register(&self.hub, offset);
        self.clock.sleep(delay).await;

        let batch = self.hub.read_at(offset);
        debug!(
            offset = %pending.offset(),
            ?pace,
            delay_ms = delay.as_millis(),
            waited_ms = pending.waited().as_millis(),
            returned = batch.events.len(),
            "adaptive poll fired"
        );
        batch
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
            y: t as f64,
            timestamp: t,
        }
    }

    fn responder(hub: &Arc<SyncHub>, clock: &FakeClock) -> AdaptivePollResponder {
        AdaptivePollResponder::new(
            Arc::clone(hub),
            Arc::new(clock.clone()),
            Duration::from_millis(1000),
            Duration::from_millis(5000),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn pending_data_schedules_short_delay() {
        let hub = Arc::new(SyncHub::new());
        hub.append(event(1));
        let clock = FakeClock::at(0);

        let batch = responder(&hub, &clock).respond(0).await;

        assert_eq!(clock.scheduled(), vec![Duration::from_millis(1000)]);
        assert_eq!(batch.events, vec![event(1)]);
        assert_eq!(batch.next, Offset(1));
    }

    #[tokio::test(start_paused = true)]
    async fn caught_up_client_schedules_long_delay() {
        let hub = Arc::new(SyncHub::new());
        hub.append(event(1));
        let clock = FakeClock::at(0);

        let batch = responder(&hub, &clock).respond(1).await;

        assert_eq!(clock.scheduled(), vec![Duration::from_millis(5000)]);
        assert!(batch.is_empty());
        assert_eq!(batch.next, Offset(1));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_wait_is_not_cut_short_by_append() {
        let hub = Arc::new(SyncHub::new());
        let clock = FakeClock::at(0);
        let poll = responder(&hub, &clock);

        let started = tokio::time::Instant::now();
        let waiter = tokio::spawn(async move { poll.respond(0).await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        hub.append(event(4));

        let batch = waiter.await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(5000));
        // Data that arrived during the wait is delivered at fire time.
        assert_eq!(batch.events, vec![event(4)]);
        assert_eq!(batch.next, Offset(1));
    }

    #[tokio::test(start_paused = true)]
    async fn events_appended_during_active_wait_are_not_skipped() {
        let hub = Arc::new(SyncHub::new());
        hub.append(event(1));
        let clock = FakeClock::at(0);
        let poll = responder(&hub, &clock);

        let waiter = tokio::spawn(async move { poll.respond(0).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        hub.append(event(2));

        let batch = waiter.await.unwrap();
        assert_eq!(batch.events, vec![event(1), event(2)]);
        assert_eq!(batch.next, Offset(2));
    }

    #[test]
    fn pace_classification() {
        assert_eq!(
            AdaptivePollResponder::pace_for(&Batch::empty(Offset(3))),
            Pace::Idle
        );
        let busy = Batch {
            events: vec![event(0)],
            start: Offset::ZERO,
            next: Offset(1),
        };
        assert_eq!(AdaptivePollResponder::pace_for(&busy), Pace::Active);
    }
}
