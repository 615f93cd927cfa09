use ice_forecast::cache::{CacheKey, CacheStats, EvictionPolicy, ForecastCache, LruEviction};
use ice_forecast::error::{FailureKind, ForecastFailure};
use ice_forecast::hybrid::{ForecastOutcome, HybridForecast};
use pretty_assertions::assert_eq;

fn success(value: f64) -> ForecastOutcome {
    Ok(HybridForecast {
        value,
        autoregressive: value - 1.0,
        correction: 1.0,
        horizon: 30,
    })
}

/// Evicts every entry as soon as it is stored
#[derive(Debug, Default)]
struct EvictImmediately;

impl EvictionPolicy for EvictImmediately {
    fn on_insert(&mut self, key: CacheKey) -> Vec<CacheKey> {
        vec![key]
    }
}

#[test]
fn test_failure_outcomes_are_stored() {
    let cache = ForecastCache::new();
    let failure = ForecastFailure::new(FailureKind::InsufficientData, "too short");
    cache.insert(&[5.0], 30, Err(failure.clone()));

    assert_eq!(cache.get(&[5.0], 30), Some(Err(failure)));
}

#[test]
fn test_horizon_separates_entries() {
    let cache = ForecastCache::new();
    cache.insert(&[1.0, 2.0], 5, success(3.0));
    cache.insert(&[1.0, 2.0], 30, success(4.0));

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&[1.0, 2.0], 5), Some(success(3.0)));
    assert_eq!(cache.get(&[1.0, 2.0], 30), Some(success(4.0)));
}

#[test]
fn test_content_not_identity_is_the_key() {
    let cache = ForecastCache::new();
    let original = vec![150.0, 151.0, 149.0];
    cache.insert(&original, 30, success(150.0));

    let copy = original.clone();
    assert_eq!(cache.get(&copy, 30), Some(success(150.0)));
    assert_eq!(cache.get(&[150.0, 151.0, 149.5], 30), None);
}

#[test]
fn test_negative_zero_is_a_different_series() {
    let cache = ForecastCache::new();
    cache.insert(&[0.0, 1.0], 1, success(1.0));

    assert_eq!(cache.get(&[-0.0, 1.0], 1), None);
}

#[test]
fn test_reinsert_replaces_entry() {
    let cache = ForecastCache::new();
    cache.insert(&[1.0], 1, success(1.0));
    cache.insert(&[1.0], 1, success(2.0));

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&[1.0], 1), Some(success(2.0)));
}

#[test]
fn test_lru_keeps_recently_used() {
    let cache = ForecastCache::with_policy(LruEviction::new(2));
    cache.insert(&[1.0], 1, success(1.0));
    cache.insert(&[2.0], 1, success(2.0));

    // Touch the first entry so the second becomes least recently used.
    assert!(cache.get(&[1.0], 1).is_some());
    cache.insert(&[3.0], 1, success(3.0));

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&[1.0], 1).is_some());
    assert!(cache.get(&[2.0], 1).is_none());
    assert!(cache.get(&[3.0], 1).is_some());
}

#[test]
fn test_custom_policy() {
    let cache = ForecastCache::with_policy(EvictImmediately);
    cache.insert(&[1.0], 1, success(1.0));

    assert!(cache.is_empty());
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 0,
            misses: 0,
            insertions: 1,
            evictions: 1,
        }
    );
}

#[test]
fn test_clear_keeps_counters() {
    let cache = ForecastCache::new();
    cache.insert(&[1.0], 1, success(1.0));
    cache.get(&[1.0], 1);
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.get(&[1.0], 1), None);
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}
