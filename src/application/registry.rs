//! Registry of throttles keyed by fault zone.
//!
//! Applications that call several downstream services need one throttle per
//! service. The registry creates them on first use with a shared configuration
//! and hands out cheap clones, so every caller of the same zone shares one
//! window.

use crate::application::ports::{Clock, RandomSource};
use crate::application::throttle::{BuildError, Throttle};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::ThrottleConfig;
use crate::infrastructure::random::ThreadRngSource;
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent map from zone name to throttle.
///
/// Backed by DashMap, so lookups from many threads only contend on the shard
/// holding the zone.
///
/// # Example
/// ```
/// use adaptive_throttle::{ThrottleConfig, ThrottleRegistry};
///
/// let registry = ThrottleRegistry::new(ThrottleConfig::default()).unwrap();
///
/// let billing = registry.get("billing");
/// let again = registry.get("billing");
/// let search = registry.get("search");
///
/// assert!(billing.shares_window_with(&again));
/// assert!(!billing.shares_window_with(&search));
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ThrottleRegistry {
    zones: Arc<DashMap<String, Throttle>>,
    config: ThrottleConfig,
    clock: Arc<dyn Clock>,
    random_source: Arc<dyn RandomSource>,
}

impl ThrottleRegistry {
    /// Create a registry whose throttles use the system clock and the default
    /// random source.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn new(config: ThrottleConfig) -> Result<Self, BuildError> {
        Self::with_sources(
            config,
            Arc::new(SystemClock::new()),
            Arc::new(ThreadRngSource::new()),
        )
    }

    /// Create a registry with custom time and random sources (mainly for
    /// testing). All throttles created by the registry share them.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn with_sources(
        config: ThrottleConfig,
        clock: Arc<dyn Clock>,
        random_source: Arc<dyn RandomSource>,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self {
            zones: Arc::new(DashMap::new()),
            config,
            clock,
            random_source,
        })
    }

    /// Get the throttle for `zone`, creating it on first use.
    pub fn get(&self, zone: &str) -> Throttle {
        if let Some(existing) = self.zones.get(zone) {
            return existing.value().clone();
        }

        self.zones
            .entry(zone.to_string())
            .or_insert_with(|| {
                tracing::debug!(zone, "creating throttle for fault zone");
                Throttle::from_parts(
                    self.config.overhead,
                    Arc::clone(&self.clock),
                    Arc::clone(&self.random_source),
                )
            })
            .value()
            .clone()
    }

    /// Get the throttle for `zone` only if it already exists.
    pub fn get_existing(&self, zone: &str) -> Option<Throttle> {
        self.zones.get(zone).map(|entry| entry.value().clone())
    }

    /// Register a custom-built throttle for `zone`, returning the previous one.
    pub fn insert(&self, zone: impl Into<String>, throttle: Throttle) -> Option<Throttle> {
        self.zones.insert(zone.into(), throttle)
    }

    /// Remove the throttle for `zone`.
    ///
    /// Callers still holding clones keep using the old window.
    pub fn remove(&self, zone: &str) -> Option<Throttle> {
        self.zones.remove(zone).map(|(_, throttle)| throttle)
    }

    /// Names of all registered zones, sorted.
    pub fn zones(&self) -> Vec<String> {
        let mut names: Vec<String> = self.zones.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// The configuration applied to newly created throttles.
    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Number of registered zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no zone has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::{FixedSample, MockClock};
    use std::thread;
    use std::time::Instant;

    fn registry() -> ThrottleRegistry {
        ThrottleRegistry::with_sources(
            ThrottleConfig::new(1.0),
            Arc::new(MockClock::new(Instant::now())),
            Arc::new(FixedSample::new(1.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_get_creates_once() {
        let registry = registry();
        assert!(registry.is_empty());

        let a = registry.get("payments");
        let b = registry.get("payments");
        assert!(a.shares_window_with(&b));
        assert_eq!(registry.len(), 1);
        assert_eq!(a.overhead(), 1.0);
    }

    #[test]
    fn test_zones_are_independent() {
        let registry = registry();
        let payments = registry.get("payments");
        let search = registry.get("search");

        let _ = payments.try_attempt(|| Err::<(), _>("down"));
        assert_eq!(payments.live_counts().failures, 1);
        assert_eq!(search.live_counts().failures, 0);

        // payments is now gated, search is not
        assert!(payments.run(|| ()).is_err());
        assert!(search.run(|| ()).is_ok());
    }

    #[test]
    fn test_get_existing_and_remove() {
        let registry = registry();
        assert!(registry.get_existing("inventory").is_none());

        let created = registry.get("inventory");
        let existing = registry.get_existing("inventory").unwrap();
        assert!(created.shares_window_with(&existing));

        let removed = registry.remove("inventory").unwrap();
        assert!(removed.shares_window_with(&created));
        assert!(registry.get_existing("inventory").is_none());

        // A fresh throttle replaces the removed one
        assert!(!registry.get("inventory").shares_window_with(&created));
    }

    #[test]
    fn test_insert_custom_throttle() {
        let registry = registry();
        let custom = Throttle::builder().with_overhead(3.0).build().unwrap();

        assert!(registry.insert("reports", custom.clone()).is_none());
        assert_eq!(registry.get("reports").overhead(), 3.0);
        assert_eq!(registry.zones(), vec!["reports".to_string()]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert_eq!(
            ThrottleRegistry::new(ThrottleConfig::new(-1.0)).unwrap_err(),
            BuildError::NonPositiveOverhead(-1.0)
        );
    }

    #[test]
    fn test_concurrent_get_returns_same_throttle() {
        let registry = registry();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.get("shared"))
            })
            .collect();

        let throttles: Vec<Throttle> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(throttles
            .windows(2)
            .all(|pair| pair[0].shares_window_with(&pair[1])));
        assert_eq!(registry.len(), 1);
    }
}
