//! Time management for the acquisition core
//!
//! Provides a clock abstraction so the same aggregation logic runs against:
//! - The host system clock (std builds)
//! - A hardware timer on bare-metal hosts (implement [`TimeSource`])
//! - A controllable mock in tests

/// Timestamp in milliseconds since epoch (or device boot for monotonic sources)
pub type Timestamp = u64;

/// Source of time for the system
///
/// Implementations might use hardware timers, RTC modules, or system calls
/// depending on the platform. `now()` must be cheap; it is called once per
/// drained event batch.
///
/// ## Example Implementation
///
/// ```rust
/// use skygauge_core::time::{TimeSource, Timestamp};
///
/// struct RtosTick;
///
/// impl TimeSource for RtosTick {
///     fn now(&self) -> Timestamp {
///         // Read the RTOS tick counter, convert to milliseconds
///         0 // placeholder
///     }
///
///     fn is_wall_clock(&self) -> bool {
///         false
///     }
///
///     fn precision_ms(&self) -> u32 {
///         1
///     }
/// }
/// ```
pub trait TimeSource: Send {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;

    /// Get precision in milliseconds
    fn precision_ms(&self) -> u32;
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Controllable time source for testing
///
/// Starts at a chosen timestamp and only moves when told to.
#[derive(Debug, Clone)]
pub struct MockTimeSource {
    timestamp: Timestamp,
}

impl MockTimeSource {
    /// Create a mock clock starting at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance the clock by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}
