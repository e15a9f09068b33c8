//! Time source for sessions and the tick loop.
//!
//! Everything that stamps a timestamp or waits for a tick goes through
//! [`Clock`], so tests can run a two-minute session without sleeping.

#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A source of whole-second Unix timestamps that can also wait.
pub trait Clock: Send + Sync {
    /// Current time as whole seconds since the Unix epoch.
    fn now(&self) -> i64;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `chrono::Utc` and `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A clock that only moves when slept on or advanced explicitly.
///
/// Time is kept in milliseconds so sub-second waits (the pause poll)
/// accumulate correctly into whole seconds.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    millis: AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    /// Create a clock frozen at `start` Unix seconds.
    #[must_use]
    pub(crate) const fn at(start: u64) -> Self {
        Self {
            millis: AtomicU64::new(start * 1000),
        }
    }

    /// Move time forward without anybody sleeping.
    pub(crate) fn advance(&self, duration: Duration) {
        #[allow(clippy::cast_possible_truncation)]
        let delta = duration.as_millis() as u64;
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> i64 {
        #[allow(clippy::cast_possible_wrap)]
        let seconds = (self.millis.load(Ordering::SeqCst) / 1000) as i64;
        seconds
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
