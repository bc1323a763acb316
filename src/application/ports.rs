//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::time::Instant;

/// Port for obtaining current time.
///
/// This abstraction allows the throttle to expire window entries without
/// depending on the system clock. Infrastructure provides concrete
/// implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for drawing uniform random samples.
///
/// The throttle draws one sample per attempt whose admission ratio is at most
/// 1.0 and admits the attempt iff the sample is below the ratio.
/// Infrastructure provides concrete implementations (ThreadRngSource,
/// FixedSample, SequenceSample).
pub trait RandomSource: Send + Sync + Debug {
    /// Draw a sample uniformly from `[0, 1)`.
    fn sample(&self) -> f64;
}
