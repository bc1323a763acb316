//! Rolling window of recent outcomes.
//!
//! Entries live in a min-heap ordered by expiry. Two atomic counters track how
//! many entries of each outcome have not been drained yet. Expiry is lazy:
//! nothing runs in the background, callers drain before each decision.
//!
//! The counters are written in exactly two places. [`RollingWindow::record`]
//! increments before the entry is pushed, and [`RollingWindow::drain_expired`]
//! subtracts only what it popped, so a counter is never smaller than the
//! number of its entries still in the heap.

use crate::domain::entry::{Outcome, WindowEntry};
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Live success and failure counts of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveCounts {
    /// Undrained successes
    pub successes: u64,
    /// Undrained failures
    pub failures: u64,
}

impl LiveCounts {
    /// Total number of undrained outcomes.
    pub fn total(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }
}

/// Thread-safe rolling window of outcomes.
#[derive(Debug, Default)]
pub struct RollingWindow {
    entries: Mutex<BinaryHeap<Reverse<WindowEntry>>>,
    successes: AtomicU64,
    failures: AtomicU64,
}

impl RollingWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome observed at `now`.
    pub fn record(&self, outcome: Outcome, now: Instant) {
        self.counter(outcome).fetch_add(1, Ordering::AcqRel);
        self.entries.lock().push(Reverse(WindowEntry::new(outcome, now)));
    }

    /// Remove every entry expired as of `now` and return the live counts.
    ///
    /// Each counter is updated with at most one atomic operation no matter how
    /// many entries were removed.
    pub fn drain_expired(&self, now: Instant) -> LiveCounts {
        let mut expired_successes = 0u64;
        let mut expired_failures = 0u64;

        {
            let mut entries = self.entries.lock();
            while let Some(&Reverse(head)) = entries.peek() {
                if !head.is_expired(now) {
                    break;
                }
                entries.pop();
                match head.outcome() {
                    Outcome::Success => expired_successes += 1,
                    Outcome::Failure => expired_failures += 1,
                }
            }
        }

        if expired_successes + expired_failures > 0 {
            tracing::trace!(
                expired_successes,
                expired_failures,
                "drained expired throttle entries"
            );
        }

        LiveCounts {
            successes: Self::release(&self.successes, expired_successes),
            failures: Self::release(&self.failures, expired_failures),
        }
    }

    /// Current counters, without draining.
    pub fn live_counts(&self) -> LiveCounts {
        LiveCounts {
            successes: self.successes.load(Ordering::Acquire),
            failures: self.failures.load(Ordering::Acquire),
        }
    }

    /// Number of entries still held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the window holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn counter(&self, outcome: Outcome) -> &AtomicU64 {
        match outcome {
            Outcome::Success => &self.successes,
            Outcome::Failure => &self.failures,
        }
    }

    fn release(counter: &AtomicU64, drained: u64) -> u64 {
        if drained == 0 {
            return counter.load(Ordering::Acquire);
        }
        let previous = counter.fetch_sub(drained, Ordering::AcqRel);
        debug_assert!(
            previous >= drained,
            "window counter underflow: {} - {}",
            previous,
            drained
        );
        previous.saturating_sub(drained)
    }
}
