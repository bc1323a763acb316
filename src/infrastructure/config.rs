//! Throttle configuration.
//!
//! A plain value type for wiring throttles from application config. With the
//! `serde` feature it can be deserialized from any serde format; missing
//! fields fall back to the defaults.
//!
//! ```toml
//! [throttle]
//! overhead = 1.5
//! ```

use crate::application::throttle::{validate_overhead, BuildError, DEFAULT_OVERHEAD};

/// Configuration for a [`Throttle`](crate::Throttle).
///
/// The window length is fixed at 60 seconds and is not configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ThrottleConfig {
    /// Ratio of attempts to successes (must be finite and > 0)
    pub overhead: f64,
}

impl ThrottleConfig {
    /// Create a configuration with the given overhead.
    pub fn new(overhead: f64) -> Self {
        Self { overhead }
    }

    /// Check that the configuration can build a throttle.
    ///
    /// # Errors
    /// Returns `BuildError` if the overhead is not a finite positive number.
    pub fn validate(&self) -> Result<(), BuildError> {
        validate_overhead(self.overhead).map(|_| ())
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            overhead: DEFAULT_OVERHEAD,
        }
    }
}
