//! Errors produced by an attempt.
//!
//! The throttle invents exactly one error of its own, [`ThrottleRejected`].
//! Errors returned by the guarded operation are passed back untouched, either
//! directly (when the caller's error type can absorb a rejection via `From`)
//! or inside [`AttemptError::Operation`].

use std::error::Error;
use std::fmt;

/// The admission gate declined to run the operation.
///
/// Carries the window state at the time of rejection for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleRejected {
    /// Successes in the window when the attempt was rejected
    pub successes: u64,
    /// Failures in the window when the attempt was rejected
    pub failures: u64,
    /// Admission ratio the random sample was compared against
    pub ratio: f64,
}

impl ThrottleRejected {
    /// Create a rejection snapshot.
    pub fn new(successes: u64, failures: u64, ratio: f64) -> Self {
        Self {
            successes,
            failures,
            ratio,
        }
    }
}

impl fmt::Display for ThrottleRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "throttle limit exceeded (last 60s: {} successes, {} failures, allowed ratio {})",
            self.successes, self.failures, self.ratio
        )
    }
}

impl Error for ThrottleRejected {}

/// Error returned by [`Throttle::try_attempt`](crate::Throttle::try_attempt).
#[derive(Debug)]
pub enum AttemptError<E> {
    /// The attempt was rejected before the operation ran
    Rejected(ThrottleRejected),
    /// The operation ran and returned this error
    Operation(E),
}

impl<E> AttemptError<E> {
    /// Returns true if the attempt was rejected by the throttle.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AttemptError::Rejected(_))
    }

    /// The rejection snapshot, if the throttle rejected the attempt.
    pub fn rejection(&self) -> Option<&ThrottleRejected> {
        match self {
            AttemptError::Rejected(rejected) => Some(rejected),
            AttemptError::Operation(_) => None,
        }
    }

    /// The operation's own error, if the operation ran and failed.
    pub fn into_operation(self) -> Option<E> {
        match self {
            AttemptError::Rejected(_) => None,
            AttemptError::Operation(e) => Some(e),
        }
    }

    /// Collapse into a single error type that can represent a rejection.
    pub fn flatten(self) -> E
    where
        E: From<ThrottleRejected>,
    {
        match self {
            AttemptError::Rejected(rejected) => E::from(rejected),
            AttemptError::Operation(e) => e,
        }
    }
}

impl<E> From<ThrottleRejected> for AttemptError<E> {
    fn from(rejected: ThrottleRejected) -> Self {
        AttemptError::Rejected(rejected)
    }
}

impl<E: fmt::Display> fmt::Display for AttemptError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Rejected(rejected) => fmt::Display::fmt(rejected, f),
            AttemptError::Operation(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl<E> Error for AttemptError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AttemptError::Rejected(rejected) => Some(rejected),
            AttemptError::Operation(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum ServiceError {
        Throttled(ThrottleRejected),
        Unavailable,
    }

    impl From<ThrottleRejected> for ServiceError {
        fn from(rejected: ThrottleRejected) -> Self {
            ServiceError::Throttled(rejected)
        }
    }

    #[test]
    fn test_rejection_message() {
        let rejected = ThrottleRejected::new(1, 9, 0.5);
        assert_eq!(
            rejected.to_string(),
            "throttle limit exceeded (last 60s: 1 successes, 9 failures, allowed ratio 0.5)"
        );
    }

    #[test]
    fn test_attempt_error_accessors() {
        let rejected: AttemptError<ServiceError> = ThrottleRejected::new(0, 5, 0.8).into();
        assert!(rejected.is_rejected());
        assert_eq!(rejected.rejection().map(|r| r.failures), Some(5));
        assert!(rejected.into_operation().is_none());

        let failed: AttemptError<ServiceError> = AttemptError::Operation(ServiceError::Unavailable);
        assert!(!failed.is_rejected());
        assert!(failed.rejection().is_none());
        assert_eq!(failed.into_operation(), Some(ServiceError::Unavailable));
    }

    #[test]
    fn test_flatten() {
        let rejection = ThrottleRejected::new(0, 5, 0.8);
        let rejected: AttemptError<ServiceError> = AttemptError::Rejected(rejection);
        assert_eq!(rejected.flatten(), ServiceError::Throttled(rejection));

        let failed: AttemptError<ServiceError> = AttemptError::Operation(ServiceError::Unavailable);
        assert_eq!(failed.flatten(), ServiceError::Unavailable);
    }

    #[test]
    fn test_source_points_at_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err: AttemptError<std::io::Error> = AttemptError::Operation(io);
        assert_eq!(err.to_string(), "connection reset");
        assert!(err.source().is_some());
    }
}
