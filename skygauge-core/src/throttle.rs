//! Per-channel commit throttling
//!
//! A [`Throttle`] enforces a minimum wall-clock spacing between committed
//! snapshot mutations for one channel, decoupling the raw callback rate
//! (10-60 Hz) from the display update budget. The first commit of a session
//! always passes.
//!
//! Monotonic accumulators (peak G) are updated before the throttle decision
//! so dropped samples still contribute their extrema; that ordering lives in
//! the aggregator, not here.

use crate::time::Timestamp;

/// Minimum-spacing commit gate for one channel
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval_ms: u64,
    last_commit: Option<Timestamp>,
}

impl Throttle {
    /// Create a gate with the given minimum spacing
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_commit: None,
        }
    }

    /// Ask to commit at `now`
    ///
    /// Returns true and records the commit when at least `interval_ms` has
    /// elapsed since the previous commit, or when nothing has committed
    /// yet. Returns false otherwise; the caller drops the value for
    /// snapshot purposes.
    pub fn try_commit(&mut self, now: Timestamp) -> bool {
        match self.last_commit {
            None => {
                self.last_commit = Some(now);
                true
            }
            Some(last) if now.saturating_sub(last) >= self.interval_ms => {
                self.last_commit = Some(now);
                true
            }
            Some(_) => false,
        }
    }

    /// Configured minimum spacing (ms)
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Timestamp of the most recent commit, if any
    pub const fn last_commit(&self) -> Option<Timestamp> {
        self.last_commit
    }
}
