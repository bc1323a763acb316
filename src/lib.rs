//! # adaptive-throttle
//!
//! Client-side adaptive throttling for calls to remote dependencies.
//!
//! As a service client there is little point in sending requests that will
//! almost certainly fail. A [`Throttle`] watches the outcomes of the last 60
//! seconds and, once failures appear, only lets through about `overhead`
//! times as many attempts as there were successes. The rest are rejected
//! locally with [`ThrottleRejected`] before any work is done. A small share of
//! attempts always gets through, so recovery is noticed.
//!
//! Use one throttle per fault zone (normally one per downstream service) and
//! share it between every caller of that service, including different
//! methods on the same service. Put the throttle around the service-specific
//! logic rather than the raw network call, so a rejected attempt skips the
//! request setup too.
//!
//! ## Quick Start
//!
//! ```rust
//! use adaptive_throttle::{Throttle, ThrottleRejected};
//!
//! #[derive(Debug)]
//! enum ClientError {
//!     Throttled(ThrottleRejected),
//!     Timeout,
//! }
//!
//! impl From<ThrottleRejected> for ClientError {
//!     fn from(rejected: ThrottleRejected) -> Self {
//!         ClientError::Throttled(rejected)
//!     }
//! }
//!
//! fn fetch_profile(id: u64) -> Result<String, ClientError> {
//!     # if id == 0 { return Err(ClientError::Timeout); }
//!     Ok(format!("profile {}", id))
//! }
//!
//! // Overhead 2.0, system clock, CSPRNG samples
//! let throttle = Throttle::new();
//!
//! match throttle.attempt(|| fetch_profile(7)) {
//!     Ok(profile) => println!("{}", profile),
//!     Err(ClientError::Throttled(rejected)) => println!("skipped: {}", rejected),
//!     Err(ClientError::Timeout) => println!("remote timed out"),
//! }
//! ```
//!
//! ## Admission Rule
//!
//! Before each attempt, outcomes older than 60 seconds are drained from the
//! window. With `s` successes, `f` failures and overhead `k`:
//!
//! - `f == 0`: the attempt runs.
//! - otherwise `ratio = k * (k + s) / (s + f)`; if `ratio > 1.0` the attempt
//!   runs, else it runs only when a uniform sample from `[0, 1)` is below
//!   `ratio`.
//!
//! Rejected attempts are counted as failures, so the stream of real attempts
//! plus rejections settles at roughly `k` times the true success rate instead
//! of reopening the gate as soon as failures age out.
//!
//! ## Error Handling
//!
//! The guarded operation's own error is never wrapped or inspected:
//!
//! - [`Throttle::attempt`] returns the operation's error type directly; it
//!   must implement `From<ThrottleRejected>`.
//! - [`Throttle::try_attempt`] returns [`AttemptError`] for error types that
//!   cannot represent a rejection.
//! - [`Throttle::run`] guards infallible operations; a panic counts as a
//!   failure and keeps unwinding.
//!
//! ## Configuration
//!
//! ```rust
//! use adaptive_throttle::{Throttle, ThrottleConfig};
//!
//! let throttle = Throttle::builder()
//!     .with_overhead(1.5)
//!     .build()
//!     .expect("valid overhead");
//!
//! // Or from application config (deserializable with the `serde` feature)
//! let throttle = Throttle::from_config(&ThrottleConfig::new(1.5)).unwrap();
//! assert_eq!(throttle.overhead(), 1.5);
//! ```
//!
//! ## Observability
//!
//! Rejections are logged at `DEBUG` through `tracing` with the window counts
//! and ratio attached. Lifetime totals are available from
//! [`Throttle::metrics`]:
//!
//! ```rust
//! # use adaptive_throttle::Throttle;
//! # let throttle = Throttle::new();
//! let snapshot = throttle.metrics().snapshot();
//! println!("rejection rate: {:.2}%", snapshot.rejection_rate() * 100.0);
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    decision::{admission_ratio, decide, Admission},
    entry::{Outcome, WindowEntry, WINDOW},
    rejection::{AttemptError, ThrottleRejected},
};

pub use application::{
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, RandomSource},
    registry::ThrottleRegistry,
    throttle::{BuildError, Throttle, ThrottleBuilder, DEFAULT_OVERHEAD},
    window::{LiveCounts, RollingWindow},
};

pub use infrastructure::{clock::SystemClock, config::ThrottleConfig, random::ThreadRngSource};
