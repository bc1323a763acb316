//! Random sample adapters.
//!
//! Provides a cryptographically strong default. Deterministic sources for
//! tests live in `crate::infrastructure::mocks`.

use crate::application::ports::RandomSource;
use rand::Rng;

/// Uniform samples from the thread-local `rand` generator.
///
/// `rand::thread_rng` is a ChaCha-based CSPRNG reseeded from the operating
/// system, so callers cannot predict which attempts will be admitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl ThreadRngSource {
    /// Create a new thread-local random source.
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRngSource {
    fn sample(&self) -> f64 {
        // Standard distribution for f64 is uniform over [0, 1)
        rand::thread_rng().gen::<f64>()
    }
}
