//! Observability metrics for a throttle.
//!
//! Lifetime totals, unlike the window counters which only cover the trailing
//! 60 seconds and drive admission.

use crate::domain::entry::Outcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking throttle activity.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Attempts allowed to run
    attempts_admitted: AtomicU64,
    /// Attempts rejected by the gate
    attempts_rejected: AtomicU64,
    /// Admitted attempts that succeeded
    operations_succeeded: AtomicU64,
    /// Admitted attempts that failed, panicked or were cancelled
    operations_failed: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_admitted(&self) {
        self.inner.attempts_admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner.attempts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completion(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Success => &self.inner.operations_succeeded,
            Outcome::Failure => &self.inner.operations_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of admitted attempts.
    pub fn attempts_admitted(&self) -> u64 {
        self.inner.attempts_admitted.load(Ordering::Relaxed)
    }

    /// Get the total number of rejected attempts.
    pub fn attempts_rejected(&self) -> u64 {
        self.inner.attempts_rejected.load(Ordering::Relaxed)
    }

    /// Get the total number of operations that succeeded.
    pub fn operations_succeeded(&self) -> u64 {
        self.inner.operations_succeeded.load(Ordering::Relaxed)
    }

    /// Get the total number of admitted operations that failed.
    pub fn operations_failed(&self) -> u64 {
        self.inner.operations_failed.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts_admitted: self.attempts_admitted(),
            attempts_rejected: self.attempts_rejected(),
            operations_succeeded: self.operations_succeeded(),
            operations_failed: self.operations_failed(),
        }
    }

    /// Reset all metrics to zero.
    ///
    /// Does not touch the throttle's window.
    pub fn reset(&self) {
        self.inner.attempts_admitted.store(0, Ordering::Relaxed);
        self.inner.attempts_rejected.store(0, Ordering::Relaxed);
        self.inner.operations_succeeded.store(0, Ordering::Relaxed);
        self.inner.operations_failed.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Attempts allowed to run
    pub attempts_admitted: u64,
    /// Attempts rejected by the gate
    pub attempts_rejected: u64,
    /// Admitted attempts that succeeded
    pub operations_succeeded: u64,
    /// Admitted attempts that failed
    pub operations_failed: u64,
}

impl MetricsSnapshot {
    /// Total attempts seen, admitted or not.
    pub fn total_attempts(&self) -> u64 {
        self.attempts_admitted.saturating_add(self.attempts_rejected)
    }

    /// Fraction of attempts rejected (0.0 to 1.0).
    ///
    /// Returns 0.0 if no attempts have been made.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            0.0
        } else {
            self.attempts_rejected as f64 / total as f64
        }
    }

    /// Fraction of completed operations that failed (0.0 to 1.0).
    ///
    /// Returns 0.0 if no operation has completed.
    pub fn failure_rate(&self) -> f64 {
        let completed = self
            .operations_succeeded
            .saturating_add(self.operations_failed);
        if completed == 0 {
            0.0
        } else {
            self.operations_failed as f64 / completed as f64
        }
    }
}
