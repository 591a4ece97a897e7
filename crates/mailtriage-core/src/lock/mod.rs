//! Advisory edit lock.
//!
//! Coordinates the batch run against the interactive editor. The lock is
//! advisory: its state is surfaced to callers but no operation is blocked
//! by it. "Don't run the batch while someone is editing" is an
//! operational convention, not a guarantee.
//!
//! Expiry is lazy: there is no timer, any state check observing that the
//! timeout has elapsed transitions the lock back to unlocked first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::time::Clock;

/// How long a save holds the lock before it lapses on its own.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// The advisory lock with its injected clock.
pub struct EditLock {
    clock: Arc<dyn Clock>,
    timeout: Duration,
    acquired_at: Option<Instant>,
}

impl std::fmt::Debug for EditLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditLock")
            .field("timeout", &self.timeout)
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

impl EditLock {
    /// Creates an unlocked lock with the default timeout.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_timeout(clock, LOCK_TIMEOUT)
    }

    /// Creates an unlocked lock with a custom timeout.
    #[must_use]
    pub const fn with_timeout(clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            clock,
            timeout,
            acquired_at: None,
        }
    }

    /// Marks the lock held as of now. Called on every data-saving write.
    pub fn acquire(&mut self) {
        self.acquired_at = Some(self.clock.now());
        debug!("edit lock acquired");
    }

    /// Explicitly releases the lock.
    pub fn release(&mut self) {
        if self.acquired_at.take().is_some() {
            debug!("edit lock released");
        }
    }

    /// Whether the lock is currently held, applying lazy expiry first.
    pub fn is_locked(&mut self) -> bool {
        if let Some(acquired_at) = self.acquired_at
            && self.clock.has_elapsed(acquired_at, self.timeout)
        {
            debug!("edit lock expired");
            self.acquired_at = None;
        }
        self.acquired_at.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::time::MockClock;

    fn lock_with_clock() -> (Arc<MockClock>, EditLock) {
        let clock = Arc::new(MockClock::new());
        let lock = EditLock::new(Arc::clone(&clock) as Arc<dyn Clock>);
        (clock, lock)
    }

    #[test]
    fn starts_unlocked() {
        let (_clock, mut lock) = lock_with_clock();
        assert!(!lock.is_locked());
    }

    #[test]
    fn acquire_then_query_before_timeout_reports_locked() {
        let (clock, mut lock) = lock_with_clock();
        lock.acquire();
        clock.advance(LOCK_TIMEOUT - Duration::from_secs(1));
        assert!(lock.is_locked());
    }

    #[test]
    fn query_after_timeout_reports_unlocked() {
        let (clock, mut lock) = lock_with_clock();
        lock.acquire();
        clock.advance(LOCK_TIMEOUT);
        assert!(!lock.is_locked());
        // Expiry is a real transition, not just a reported value.
        assert!(!lock.is_locked());
    }

    #[test]
    fn explicit_release_clears_the_lock() {
        let (_clock, mut lock) = lock_with_clock();
        lock.acquire();
        lock.release();
        assert!(!lock.is_locked());
    }

    #[test]
    fn reacquire_restarts_the_timeout() {
        let (clock, mut lock) = lock_with_clock();
        lock.acquire();
        clock.advance(LOCK_TIMEOUT - Duration::from_secs(1));
        lock.acquire();
        clock.advance(Duration::from_secs(2));
        assert!(lock.is_locked());
    }
}
