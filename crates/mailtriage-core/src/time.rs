//! Time abstraction for testability.
//!
//! The advisory lock's expiry is a pure function of elapsed time, so the
//! clock is injected: [`SystemClock`] in production, [`MockClock`] in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Abstraction over time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;

    /// Returns the elapsed time since the given instant.
    fn elapsed(&self, since: Instant) -> Duration {
        self.now().duration_since(since)
    }

    /// Checks if a duration has elapsed since the given instant.
    fn has_elapsed(&self, since: Instant, duration: Duration) -> bool {
        self.elapsed(since) >= duration
    }
}

/// System clock that uses real time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A mock clock for testing time-dependent code.
///
/// Starts at a base instant and only moves when advanced manually.
///
/// # Example
///
/// ```
/// use mailtriage_core::time::{Clock, MockClock};
/// use std::time::Duration;
///
/// let clock = MockClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.elapsed(start), Duration::from_secs(5));
/// ```
#[derive(Debug)]
pub struct MockClock {
    base: Instant,
    offset_nanos: AtomicU64,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    /// Creates a new mock clock starting at the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Advances the clock by the given duration.
    ///
    /// Durations beyond ~584 years are truncated, which a test never needs.
    #[allow(clippy::cast_possible_truncation)]
    pub fn advance(&self, duration: Duration) {
        self.offset_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}
