//! Clock abstraction for testable time handling.
//!
//! Every deliberate wait in the poll responders is scheduled through
//! [`Clock::sleep`], and the producer's response time is measured against
//! [`Clock::now_millis`]. Production uses [`SystemClock`]; tests use
//! [`FakeClock`] to pin the wall clock and inspect scheduled delays.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;

/// Source of wall-clock time and scheduled waits.
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time in epoch milliseconds.
    fn now_millis(&self) -> i64;

    /// A future that completes after `duration`.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Real system clock backed by `chrono` and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Fake clock with a settable wall time that records every scheduled wait.
///
/// Sleeps still run on tokio's timer, so tests pair this with
/// `#[tokio::test(start_paused = true)]` to make them instant.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    now_ms: Arc<AtomicI64>,
    scheduled: Arc<Mutex<Vec<Duration>>>,
}

impl FakeClock {
    /// Create a fake clock pinned at `now_ms`.
    pub fn at(now_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(now_ms)),
            scheduled: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Move the wall clock to `now_ms`.
    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Every duration passed to [`Clock::sleep`] so far, in call order.
    pub fn scheduled(&self) -> Vec<Duration> {
        self.scheduled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.scheduled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        Box::pin(tokio::time::sleep(duration))
    }
}
