//! Throttle coordination logic.
//!
//! Each attempt goes through four steps: drain expired entries, decide, run
//! the operation (or reject), record the outcome. The steps are not atomic as
//! a unit and no lock is held while the operation runs, so a slow dependency
//! never blocks other callers' decisions.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, RandomSource};
use crate::application::window::{LiveCounts, RollingWindow};
use crate::domain::{
    decision::{admission_ratio, decide, Admission},
    entry::Outcome,
    rejection::{AttemptError, ThrottleRejected},
};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::ThrottleConfig;
use crate::infrastructure::random::ThreadRngSource;
use std::future::Future;
use std::sync::Arc;

/// Default ratio of attempts to successes.
pub const DEFAULT_OVERHEAD: f64 = 2.0;

/// Error returned when building a [`Throttle`] fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuildError {
    /// Overhead must be greater than zero
    NonPositiveOverhead(f64),
    /// Overhead must be a finite number
    NonFiniteOverhead(f64),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::NonPositiveOverhead(overhead) => {
                write!(f, "overhead must be greater than 0, got {}", overhead)
            }
            BuildError::NonFiniteOverhead(overhead) => {
                write!(f, "overhead must be finite, got {}", overhead)
            }
        }
    }
}

impl std::error::Error for BuildError {}

pub(crate) fn validate_overhead(overhead: f64) -> Result<f64, BuildError> {
    if !overhead.is_finite() {
        return Err(BuildError::NonFiniteOverhead(overhead));
    }
    if overhead <= 0.0 {
        return Err(BuildError::NonPositiveOverhead(overhead));
    }
    Ok(overhead)
}

/// Builder for constructing a [`Throttle`].
#[derive(Debug)]
pub struct ThrottleBuilder {
    overhead: f64,
    clock: Option<Arc<dyn Clock>>,
    random_source: Option<Arc<dyn RandomSource>>,
}

impl ThrottleBuilder {
    /// Set the ratio of attempts to successes.
    ///
    /// Higher values let more attempts through per observed success. The value
    /// is validated when `build()` is called.
    pub fn with_overhead(mut self, overhead: f64) -> Self {
        self.overhead = overhead;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set a custom random source (mainly for testing).
    pub fn with_random_source(mut self, random_source: Arc<dyn RandomSource>) -> Self {
        self.random_source = Some(random_source);
        self
    }

    /// Apply a loaded configuration.
    pub fn with_config(self, config: &ThrottleConfig) -> Self {
        self.with_overhead(config.overhead)
    }

    /// Build the throttle.
    ///
    /// # Errors
    /// Returns `BuildError` if the overhead is not a finite positive number.
    pub fn build(self) -> Result<Throttle, BuildError> {
        let overhead = validate_overhead(self.overhead)?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let random_source = self
            .random_source
            .unwrap_or_else(|| Arc::new(ThreadRngSource::new()));

        Ok(Throttle::from_parts(overhead, clock, random_source))
    }
}

impl Default for ThrottleBuilder {
    fn default() -> Self {
        Self {
            overhead: DEFAULT_OVERHEAD,
            clock: None,
            random_source: None,
        }
    }
}

/// Adaptive throttle guarding one fault zone.
///
/// Once failures show up in the trailing 60 seconds, attempts are admitted
/// with probability `overhead * (overhead + successes) / (successes + failures)`.
/// Rejected attempts count as failures.
///
/// `Throttle` is a cheap handle: clones share the same window, so create one
/// per downstream service and hand clones to every caller of that service.
///
/// # Example
/// ```
/// use adaptive_throttle::{Throttle, ThrottleRejected};
///
/// #[derive(Debug)]
/// enum FetchError {
///     Throttled(ThrottleRejected),
///     NotFound,
/// }
///
/// impl From<ThrottleRejected> for FetchError {
///     fn from(rejected: ThrottleRejected) -> Self {
///         FetchError::Throttled(rejected)
///     }
/// }
///
/// let throttle = Throttle::new();
///
/// let found: Result<u32, FetchError> = throttle.attempt(|| Ok(42));
/// assert_eq!(found.unwrap(), 42);
///
/// let missing: Result<u32, FetchError> = throttle.attempt(|| Err(FetchError::NotFound));
/// assert!(matches!(missing, Err(FetchError::NotFound)));
/// ```
#[derive(Debug, Clone)]
pub struct Throttle {
    inner: Arc<ThrottleInner>,
}

#[derive(Debug)]
struct ThrottleInner {
    overhead: f64,
    clock: Arc<dyn Clock>,
    random_source: Arc<dyn RandomSource>,
    window: RollingWindow,
    metrics: Metrics,
}

impl Throttle {
    /// Create a throttle with default settings.
    ///
    /// Defaults:
    /// - Overhead: 2.0
    /// - Clock: system monotonic clock
    /// - Random source: thread-local CSPRNG
    pub fn new() -> Self {
        Self::from_parts(
            DEFAULT_OVERHEAD,
            Arc::new(SystemClock::new()),
            Arc::new(ThreadRngSource::new()),
        )
    }

    /// Create a builder for configuring a throttle.
    pub fn builder() -> ThrottleBuilder {
        ThrottleBuilder::default()
    }

    /// Create a throttle from a loaded configuration.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn from_config(config: &ThrottleConfig) -> Result<Self, BuildError> {
        Self::builder().with_config(config).build()
    }

    pub(crate) fn from_parts(
        overhead: f64,
        clock: Arc<dyn Clock>,
        random_source: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            inner: Arc::new(ThrottleInner {
                overhead,
                clock,
                random_source,
                window: RollingWindow::new(),
                metrics: Metrics::new(),
            }),
        }
    }

    /// Run `operation` unless the throttle rejects the attempt.
    ///
    /// The operation's error is returned unchanged. A rejection is converted
    /// into the caller's error type through `From<ThrottleRejected>`. Errors,
    /// panics and rejections are all recorded as failures.
    pub fn attempt<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<ThrottleRejected>,
    {
        self.try_attempt(operation).map_err(AttemptError::flatten)
    }

    /// Like [`attempt`](Self::attempt), for error types that cannot represent
    /// a rejection.
    pub fn try_attempt<T, E, F>(&self, operation: F) -> Result<T, AttemptError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.admit()?;

        let pending = PendingAttempt::new(self);
        let result = operation();
        pending.complete(outcome_of(&result));

        result.map_err(AttemptError::Operation)
    }

    /// Run an infallible operation unless the throttle rejects the attempt.
    ///
    /// The only way such an operation can fail is by panicking; the panic is
    /// recorded as a failure and then continues to unwind.
    pub fn run<T, F>(&self, operation: F) -> Result<T, ThrottleRejected>
    where
        F: FnOnce() -> T,
    {
        self.admit()?;

        let pending = PendingAttempt::new(self);
        let value = operation();
        pending.complete(Outcome::Success);

        Ok(value)
    }

    /// Async variant of [`attempt`](Self::attempt).
    ///
    /// The decision is taken on first poll, before `operation` is called, and
    /// the outcome is recorded when the operation's future resolves. Dropping
    /// the returned future after admission records a failure.
    pub async fn attempt_async<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ThrottleRejected>,
    {
        self.admit()?;

        let pending = PendingAttempt::new(self);
        let result = operation().await;
        pending.complete(outcome_of(&result));

        result
    }

    /// The configured ratio of attempts to successes.
    pub fn overhead(&self) -> f64 {
        self.inner.overhead
    }

    /// Lifetime metrics for this throttle.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Window counters as of the last drain.
    ///
    /// Expired entries are only removed when the next attempt arrives, so
    /// after an idle period this may still include stale outcomes.
    pub fn live_counts(&self) -> LiveCounts {
        self.inner.window.live_counts()
    }

    /// Whether two handles refer to the same throttle.
    pub fn shares_window_with(&self, other: &Throttle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Drain expired entries now and return the resulting counts.
    pub fn refresh(&self) -> LiveCounts {
        self.inner.window.drain_expired(self.inner.clock.now())
    }

    fn admit(&self) -> Result<(), ThrottleRejected> {
        let inner = &self.inner;
        let counts = inner.window.drain_expired(inner.clock.now());

        match decide(inner.overhead, counts.successes, counts.failures, || {
            inner.random_source.sample()
        }) {
            Admission::Admit => {
                if counts.failures > 0 {
                    let ratio = admission_ratio(inner.overhead, counts.successes, counts.failures);
                    if ratio <= 1.0 {
                        tracing::trace!(
                            successes = counts.successes,
                            failures = counts.failures,
                            ratio,
                            "throttle admitted attempt through gate"
                        );
                    }
                }
                inner.metrics.record_admitted();
                Ok(())
            }
            Admission::Reject(rejected) => {
                tracing::debug!(
                    successes = rejected.successes,
                    failures = rejected.failures,
                    ratio = rejected.ratio,
                    "throttle rejected attempt"
                );
                inner.metrics.record_rejected();
                // A rejection counts as a failure so that attempts plus
                // rejections converge on `overhead` times the success rate.
                inner.window.record(Outcome::Failure, inner.clock.now());
                Err(rejected)
            }
        }
    }

    fn record(&self, outcome: Outcome) {
        self.inner.window.record(outcome, self.inner.clock.now());
        self.inner.metrics.record_completion(outcome);
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new()
    }
}

fn outcome_of<T, E>(result: &Result<T, E>) -> Outcome {
    match result {
        Ok(_) => Outcome::Success,
        Err(_) => Outcome::Failure,
    }
}

/// Records exactly one outcome for an admitted attempt.
///
/// If the guard is dropped without `complete` (the operation panicked or the
/// future was dropped), a failure is recorded.
struct PendingAttempt<'a> {
    throttle: &'a Throttle,
    completed: bool,
}

impl<'a> PendingAttempt<'a> {
    fn new(throttle: &'a Throttle) -> Self {
        Self {
            throttle,
            completed: false,
        }
    }

    fn complete(mut self, outcome: Outcome) {
        self.completed = true;
        self.throttle.record(outcome);
    }
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::debug!(
                panicking = std::thread::panicking(),
                "throttled operation did not complete"
            );
            self.throttle.record(Outcome::Failure);
        }
    }
}
