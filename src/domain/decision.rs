//! Admission decisions.
//!
//! Given the live counts of the window, the configured overhead and a uniform
//! random sample, decide whether an attempt may run. The function is pure: the
//! caller supplies the counts and the sample, nothing here touches shared state.

use crate::domain::rejection::ThrottleRejected;

/// Outcome of an admission decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// Run the operation
    Admit,
    /// Do not run the operation; carries the state that caused the rejection
    Reject(ThrottleRejected),
}

impl Admission {
    /// Returns true if the attempt is admitted.
    pub fn is_admit(&self) -> bool {
        matches!(self, Admission::Admit)
    }

    /// Returns true if the attempt is rejected.
    pub fn is_reject(&self) -> bool {
        matches!(self, Admission::Reject(_))
    }
}

/// Compute the admission ratio `k * (k + s) / (s + f)`.
///
/// The `+ k` term keeps the ratio above zero even when no successes have been
/// seen in the window, so the gate never closes for good. Only meaningful when
/// `failures > 0`.
///
/// # Example
/// ```
/// use adaptive_throttle::admission_ratio;
///
/// assert_eq!(admission_ratio(2.0, 0, 1), 4.0);
/// assert_eq!(admission_ratio(2.0, 0, 4), 1.0);
/// assert_eq!(admission_ratio(2.0, 0, 5), 0.8);
/// ```
pub fn admission_ratio(overhead: f64, successes: u64, failures: u64) -> f64 {
    let successes = successes as f64;
    let failures = failures as f64;
    overhead * ((overhead + successes) / (successes + failures))
}

/// Decide whether an attempt is admitted.
///
/// * no failures in the window: admit
/// * ratio above 1.0: admit
/// * otherwise admit iff `sample() < ratio`
///
/// `sample` is only invoked when the ratio actually gates the attempt, so
/// healthy throttles never consume randomness.
///
/// # Example
/// ```
/// use adaptive_throttle::{decide, Admission};
///
/// // Healthy zone: no failures, the sample is never drawn
/// assert!(decide(2.0, 10, 0, || unreachable!()).is_admit());
///
/// // overhead 1, one failure: ratio is exactly 1.0 and a sample of 1.0 loses
/// assert!(decide(1.0, 0, 1, || 1.0).is_reject());
/// ```
pub fn decide<F>(overhead: f64, successes: u64, failures: u64, sample: F) -> Admission
where
    F: FnOnce() -> f64,
{
    if failures == 0 {
        return Admission::Admit;
    }

    let ratio = admission_ratio(overhead, successes, failures);
    if ratio > 1.0 || sample() < ratio {
        Admission::Admit
    } else {
        Admission::Reject(ThrottleRejected::new(successes, failures, ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_failures_always_admits() {
        for successes in [0, 1, 7, 10_000] {
            for sample in [0.0, 0.5, 0.999_999, 1.0] {
                assert_eq!(
                    decide(2.0, successes, 0, || sample),
                    Admission::Admit,
                    "successes={} sample={}",
                    successes,
                    sample
                );
            }
        }
    }

    #[test]
    fn test_no_failures_ignores_overhead() {
        assert!(decide(0.01, 0, 0, || 0.999).is_admit());
    }

    #[test]
    fn test_ratio_above_one_admits_regardless_of_sample() {
        assert_eq!(admission_ratio(2.0, 0, 1), 4.0);
        assert!(decide(2.0, 0, 1, || 0.999_999).is_admit());
    }

    #[test]
    fn test_sample_not_drawn_above_one() {
        let mut drawn = false;
        let decision = decide(2.0, 3, 1, || {
            drawn = true;
            0.0
        });
        assert!(decision.is_admit());
        assert!(!drawn);
    }

    #[test]
    fn test_tight_gate_boundary() {
        assert_eq!(admission_ratio(1.0, 0, 1), 1.0);

        // Admit iff sample < ratio
        assert!(decide(1.0, 0, 1, || 0.999_999).is_admit());
        match decide(1.0, 0, 1, || 1.0) {
            Admission::Reject(rejected) => {
                assert_eq!(rejected.successes, 0);
                assert_eq!(rejected.failures, 1);
                assert_eq!(rejected.ratio, 1.0);
            }
            Admission::Admit => panic!("sample equal to ratio must be rejected"),
        }
    }

    #[test]
    fn test_ratio_crossover() {
        assert_eq!(admission_ratio(2.0, 0, 4), 1.0);
        assert!(decide(2.0, 0, 4, || 0.0).is_admit());

        assert_eq!(admission_ratio(2.0, 0, 5), 0.8);
        assert!(decide(2.0, 0, 5, || 0.79).is_admit());
        assert!(decide(2.0, 0, 5, || 0.99).is_reject());
    }

    #[test]
    fn test_ratio_never_reaches_zero() {
        let ratio = admission_ratio(2.0, 0, 1_000_000);
        assert!(ratio > 0.0);
        assert!(decide(2.0, 0, 1_000_000, || 0.0).is_admit());
    }

    #[test]
    fn test_successes_raise_ratio() {
        let without = admission_ratio(2.0, 0, 10);
        let with = admission_ratio(2.0, 5, 10);
        assert!(with > without);
        assert_eq!(with, 2.0 * (7.0 / 15.0));
    }
}
