//! Window entries: one recorded outcome and the instant it stops counting.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

/// Length of the trailing window over which outcomes are counted.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Result of a single attempt as seen by the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The guarded operation completed without error
    Success,
    /// The guarded operation failed, panicked, or was rejected
    Failure,
}

impl Outcome {
    /// Returns true for [`Outcome::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Returns true for [`Outcome::Failure`].
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Failure)
    }
}

/// A single outcome tracked by the rolling window.
///
/// Entries are immutable. Equality compares outcome and expiry; ordering
/// compares expiry only, so entries sharing an expiry are interchangeable
/// when draining.
///
/// # Example
/// ```
/// use adaptive_throttle::{Outcome, WindowEntry, WINDOW};
/// use std::time::Instant;
///
/// let now = Instant::now();
/// let entry = WindowEntry::new(Outcome::Failure, now);
///
/// assert_eq!(entry.expiry(), now + WINDOW);
/// assert!(!entry.is_expired(now));
/// assert!(entry.is_expired(now + WINDOW));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowEntry {
    outcome: Outcome,
    expiry: Instant,
}

impl WindowEntry {
    /// Create an entry for an outcome observed at `now`.
    pub fn new(outcome: Outcome, now: Instant) -> Self {
        Self {
            outcome,
            expiry: now + WINDOW,
        }
    }

    /// The recorded outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The instant from which this entry no longer counts.
    pub fn expiry(&self) -> Instant {
        self.expiry
    }

    /// Whether the entry has expired as of `now` (expiry ≤ now).
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry <= now
    }

    /// Time left before the entry expires, zero if already expired.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expiry.saturating_duration_since(now)
    }
}

impl PartialOrd for WindowEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WindowEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap needs Ord consistent with Eq, so break expiry ties on
        // outcome. Draining never depends on the tie-break.
        self.expiry
            .cmp(&other.expiry)
            .then_with(|| self.outcome.is_success().cmp(&other.outcome.is_success()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(entry: &WindowEntry) -> u64 {
        let mut hasher = DefaultHasher::new();
        entry.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_expiry_is_one_window_after_creation() {
        let now = Instant::now();
        let entry = WindowEntry::new(Outcome::Success, now);
        assert_eq!(entry.expiry(), now + Duration::from_secs(60));
        assert_eq!(entry.outcome(), Outcome::Success);
    }

    #[test]
    fn test_equality_ignores_clock_identity() {
        let now = Instant::now();

        // Two independent clocks reading the same instant
        let a = WindowEntry::new(Outcome::Success, now);
        let b = WindowEntry::new(Outcome::Success, now);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        // Same instant, different outcome
        let c = WindowEntry::new(Outcome::Failure, now);
        assert_ne!(a, c);

        // Same outcome, one second later
        let d = WindowEntry::new(Outcome::Failure, now + Duration::from_secs(1));
        assert_ne!(c, d);
        assert_eq!(d, WindowEntry::new(Outcome::Failure, now + Duration::from_secs(1)));
    }

    #[test]
    fn test_ordering_by_expiry() {
        let now = Instant::now();
        let early = WindowEntry::new(Outcome::Success, now);
        let late = WindowEntry::new(Outcome::Failure, now + Duration::from_millis(1));

        assert!(early < late);
        assert_eq!(early.max(late), late);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Instant::now();
        let entry = WindowEntry::new(Outcome::Failure, now);

        assert!(!entry.is_expired(now + WINDOW - Duration::from_nanos(1)));
        assert!(entry.is_expired(now + WINDOW));
        assert!(entry.is_expired(now + WINDOW + Duration::from_secs(1)));
    }

    #[test]
    fn test_remaining_saturates() {
        let now = Instant::now();
        let entry = WindowEntry::new(Outcome::Success, now);

        assert_eq!(entry.remaining(now), WINDOW);
        assert_eq!(entry.remaining(now + Duration::from_secs(90)), Duration::ZERO);
    }
}
