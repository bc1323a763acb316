//! Deterministic random sources for testing.

use crate::application::ports::RandomSource;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Random source that always returns the same sample.
///
/// The value is not range-checked, so a sample of exactly `1.0` can be used
/// to force a rejection whenever the admission ratio is at most 1.0.
///
/// ```
/// use adaptive_throttle::infrastructure::mocks::FixedSample;
/// use adaptive_throttle::application::ports::RandomSource;
///
/// let source = FixedSample::new(0.99);
/// assert_eq!(source.sample(), 0.99);
/// assert_eq!(source.sample(), 0.99);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSample {
    value: f64,
}

impl FixedSample {
    /// Create a source that always yields `value`.
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl RandomSource for FixedSample {
    fn sample(&self) -> f64 {
        self.value
    }
}

/// Random source that cycles through a fixed list of samples.
///
/// Also counts how many samples were drawn, which lets tests check that
/// healthy throttles never consume randomness.
#[derive(Debug)]
pub struct SequenceSample {
    values: Vec<f64>,
    draws: AtomicUsize,
}

impl SequenceSample {
    /// Create a source cycling through `values`.
    ///
    /// # Panics
    /// Panics if `values` is empty.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "SequenceSample needs at least one value");
        Self {
            values,
            draws: AtomicUsize::new(0),
        }
    }

    /// Number of samples drawn so far.
    pub fn draws(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }
}

impl RandomSource for SequenceSample {
    fn sample(&self) -> f64 {
        let index = self.draws.fetch_add(1, Ordering::SeqCst);
        self.values[index % self.values.len()]
    }
}
