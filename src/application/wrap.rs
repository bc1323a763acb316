//! Call-shape adapters.
//!
//! Turn plain functions into throttled closures. Every wrapped closure holds a
//! clone of the throttle, so wrapping several functions of the same service
//! makes them share one window.

use crate::application::throttle::Throttle;
use crate::domain::rejection::ThrottleRejected;

impl Throttle {
    /// Wrap a zero-argument fallible function.
    ///
    /// # Example
    /// ```
    /// use adaptive_throttle::{Throttle, ThrottleRejected};
    ///
    /// #[derive(Debug)]
    /// struct Unavailable;
    ///
    /// impl From<ThrottleRejected> for Unavailable {
    ///     fn from(_: ThrottleRejected) -> Self {
    ///         Unavailable
    ///     }
    /// }
    ///
    /// let throttle = Throttle::new();
    /// let ping = throttle.wrap(|| Ok::<_, Unavailable>("pong"));
    /// assert_eq!(ping().unwrap(), "pong");
    /// ```
    pub fn wrap<T, E, F>(&self, f: F) -> impl Fn() -> Result<T, E>
    where
        F: Fn() -> Result<T, E>,
        E: From<ThrottleRejected>,
    {
        let throttle = self.clone();
        move || throttle.attempt(&f)
    }

    /// Wrap a one-argument fallible function.
    pub fn wrap1<A, T, E, F>(&self, f: F) -> impl Fn(A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        E: From<ThrottleRejected>,
    {
        let throttle = self.clone();
        move |a| throttle.attempt(|| f(a))
    }

    /// Wrap a two-argument fallible function.
    pub fn wrap2<A, B, T, E, F>(&self, f: F) -> impl Fn(A, B) -> Result<T, E>
    where
        F: Fn(A, B) -> Result<T, E>,
        E: From<ThrottleRejected>,
    {
        let throttle = self.clone();
        move |a, b| throttle.attempt(|| f(a, b))
    }

    /// Wrap an infallible procedure; only panics count as failures.
    pub fn wrap_infallible<T, F>(&self, f: F) -> impl Fn() -> Result<T, ThrottleRejected>
    where
        F: Fn() -> T,
    {
        let throttle = self.clone();
        move || throttle.run(&f)
    }
}
