//! Lock-Free Raw Event Queues
#![allow(unsafe_code)] // Required for lock-free atomic operations
//!
//! ## Overview
//!
//! Bounded, lock-free single-producer queues carrying raw platform events
//! from sensor callbacks to the aggregating task. A sensor callback may run
//! in an interrupt or a platform event loop where blocking is forbidden, so
//! `push` is wait-free: it either stores the event or drops it and counts
//! the overflow.
//!
//! ## Why Lock-Free?
//!
//! A mutex inside a sensor callback invites priority inversion and
//! unpredictable latency, and a single slow consumer would stall every
//! producer. The ring buffer with atomic head/tail needs neither:
//!
//! ```text
//! Producer (callback)               Consumer (aggregator)
//!      ↓                                 ↓
//!   Atomic Write ────→ Ring Buffer ←─── Atomic Read
//!      ↓                                 ↓
//!   Never Blocks                     Never Blocks
//! ```
//!
//! ## Memory Ordering
//!
//! - **Acquire**: loads of head/tail observe the matching writes
//! - **Release**: buffer writes become visible before the index moves
//! - **Relaxed**: statistics, which do not affect correctness
//!
//! ## Constraints
//!
//! 1. **Single Producer**: exactly one thread pushes to a given queue; the
//!    intake gives each channel its own queue so this holds structurally
//! 2. **Power-of-Two Capacity**: index wrapping uses a mask
//! 3. **Copy Payloads**: slots are plain `MaybeUninit` cells; events left
//!    in a dropped queue are not individually dropped

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Lock-free raw event queue
///
/// Generic over the raw event type so each channel carries its own payload
/// without a tagging enum. Capacity `N` must be a power of two; violations
/// fail at compile time.
///
/// ## Example Usage
///
/// ```rust
/// use skygauge_core::queue::RawQueue;
/// use skygauge_core::events::RawPressure;
///
/// static BARO: RawQueue<RawPressure, 16> = RawQueue::new();
///
/// // Producer (sensor callback)
/// BARO.push(RawPressure { hpa: 1013.0, timestamp: 0 });
///
/// // Consumer (aggregator)
/// while let Some(sample) = BARO.pop() {
///     // decode and commit
/// }
/// ```
pub struct RawQueue<T, const N: usize> {
    /// Ring buffer storage, interior-mutable behind the atomics
    buffer: UnsafeCell<[MaybeUninit<T>; N]>,

    /// Next write position (producer owned)
    head: AtomicUsize,

    /// Next read position (consumer shared)
    tail: AtomicUsize,

    /// Queue statistics
    stats: QueueStats,
}

/// Queue health counters
///
/// Updated with relaxed ordering so they never slow the data path.
pub struct QueueStats {
    /// Total events pushed
    pub pushed: AtomicU32,
    /// Total events popped
    pub popped: AtomicU32,
    /// Events dropped because the queue was full
    pub dropped: AtomicU32,
    /// Maximum depth seen
    pub max_depth: AtomicU32,
}

impl QueueStats {
    const fn new() -> Self {
        Self {
            pushed: AtomicU32::new(0),
            popped: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            max_depth: AtomicU32::new(0),
        }
    }

    /// Update max depth if current is higher
    fn update_max_depth(&self, current: u32) {
        let mut max = self.max_depth.load(Ordering::Relaxed);
        while current > max {
            match self.max_depth.compare_exchange_weak(
                max,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => max = actual,
            }
        }
    }

    /// Overflow count snapshot
    pub fn dropped_count(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T, const N: usize> RawQueue<T, N> {
    /// Monomorphization-time guard for the mask-based index wrap
    const CAPACITY_IS_POW2: () = assert!(N.is_power_of_two(), "capacity must be a power of two");

    /// Create new empty queue
    ///
    /// Usable in static context, so a queue can live next to the callback
    /// that feeds it.
    pub const fn new() -> Self {
        let _ = Self::CAPACITY_IS_POW2;
        Self {
            buffer: UnsafeCell::new(unsafe { MaybeUninit::uninit().assume_init() }),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            stats: QueueStats::new(),
        }
    }

    /// Push an event (single producer)
    ///
    /// Returns false and counts a drop when the queue is full. Wait-free;
    /// safe inside interrupt handlers.
    ///
    /// Only one thread may push to a given queue.
    pub fn push(&self, event: T) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let next_head = (head + 1) & (N - 1); // Fast modulo for power of 2

        // Check if queue is full
        if next_head == self.tail.load(Ordering::Acquire) {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // Safe because we're the only producer for this slot
        unsafe {
            let buffer = &mut *self.buffer.get();
            buffer[head].write(event);
        }

        // Make the write visible before updating head
        self.head.store(next_head, Ordering::Release);

        self.stats.pushed.fetch_add(1, Ordering::Relaxed);
        self.update_depth_stats();

        true
    }

    /// Pop an event
    ///
    /// Returns None when the queue is empty. Multiple consumers may race;
    /// the compare-exchange loop hands each slot to exactly one of them.
    pub fn pop(&self) -> Option<T> {
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let head = self.head.load(Ordering::Acquire);

            // Check if queue is empty
            if tail == head {
                return None;
            }

            // Try to claim this slot
            let next_tail = (tail + 1) & (N - 1);
            match self.tail.compare_exchange_weak(
                tail,
                next_tail,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    let event = unsafe {
                        let buffer = &*self.buffer.get();
                        ptr::read(&buffer[tail]).assume_init()
                    };

                    self.stats.popped.fetch_add(1, Ordering::Relaxed);
                    return Some(event);
                }
                Err(_) => {
                    // Another consumer claimed it, retry
                    core::hint::spin_loop();
                }
            }
        }
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);

        if head >= tail {
            head - tail
        } else {
            N - tail + head
        }
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Check if queue is full
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        ((head + 1) & (N - 1)) == tail
    }

    /// Get queue statistics
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Drain all queued events
    pub fn drain(&self) -> QueueDrain<'_, T, N> {
        QueueDrain { queue: self }
    }

    /// Update depth statistics
    fn update_depth_stats(&self) {
        let depth = self.len() as u32;
        self.stats.update_max_depth(depth);
    }
}

// Safe to share between threads: the atomics serialize slot handoff and the
// payload itself moves through the queue.
unsafe impl<T: Send, const N: usize> Send for RawQueue<T, N> {}
unsafe impl<T: Send, const N: usize> Sync for RawQueue<T, N> {}

/// Iterator draining a queue until empty
pub struct QueueDrain<'a, T, const N: usize> {
    queue: &'a RawQueue<T, N>,
}

impl<'a, T, const N: usize> Iterator for QueueDrain<'a, T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RawPressure;

    fn sample(hpa: f32, ts: u64) -> RawPressure {
        RawPressure { hpa, timestamp: ts }
    }

    #[test]
    fn queue_basic() {
        let queue = RawQueue::<RawPressure, 16>::new();

        assert!(queue.push(sample(1010.0, 1000)));
        assert_eq!(queue.len(), 1);

        let popped = queue.pop().unwrap();
        assert_eq!(popped.hpa, 1010.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_full_drops_and_counts() {
        let queue = RawQueue::<RawPressure, 4>::new();

        // Fill queue (capacity - 1 due to ring buffer)
        for i in 0..3 {
            assert!(queue.push(sample(1000.0 + i as f32, i)));
        }
        assert!(queue.is_full());

        assert!(!queue.push(sample(999.0, 99)));
        assert_eq!(queue.stats().dropped_count(), 1);

        // Earliest event survives; the overflowing one was dropped
        assert_eq!(queue.pop().unwrap().hpa, 1000.0);
    }

    #[test]
    fn queue_drain() {
        let queue = RawQueue::<RawPressure, 8>::new();

        for i in 0..5u64 {
            queue.push(sample(1000.0, i));
        }

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 5);
        assert!(queue.is_empty());

        // Drained oldest first
        assert_eq!(drained[0].timestamp, 0);
        assert_eq!(drained[4].timestamp, 4);
    }

    #[test]
    fn depth_statistics_track_high_water() {
        let queue = RawQueue::<RawPressure, 8>::new();
        for i in 0..4u64 {
            queue.push(sample(1000.0, i));
        }
        queue.pop();

        assert_eq!(queue.stats().max_depth.load(Ordering::Relaxed), 4);
        assert_eq!(queue.stats().pushed.load(Ordering::Relaxed), 4);
        assert_eq!(queue.stats().popped.load(Ordering::Relaxed), 1);
    }
}
