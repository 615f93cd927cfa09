//! Memoisation of forecast outcomes
//!
//! Outcomes are keyed by a fingerprint of the series content plus the
//! horizon. The full bit pattern of the series is kept with each entry, so
//! a fingerprint collision reads as a miss instead of returning another
//! series' forecast. Which entries to drop is delegated to an
//! [`EvictionPolicy`]; the default never evicts.

use crate::hybrid::ForecastOutcome;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Identity of a `(series, horizon)` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    fingerprint: u64,
    len: usize,
    horizon: usize,
}

impl CacheKey {
    /// Key for a series and horizon
    pub fn new(series: &[f64], horizon: usize) -> Self {
        let mut hasher = DefaultHasher::new();
        for value in series {
            value.to_bits().hash(&mut hasher);
        }
        Self {
            fingerprint: hasher.finish(),
            len: series.len(),
            horizon,
        }
    }

    /// Requested horizon
    pub fn horizon(&self) -> usize {
        self.horizon
    }
}

/// Decides which cached entries to drop
pub trait EvictionPolicy: Send + Debug {
    /// Record an insertion, returning the keys to evict
    fn on_insert(&mut self, key: CacheKey) -> Vec<CacheKey>;

    /// Record a cache hit
    fn on_hit(&mut self, _key: &CacheKey) {}

    /// Forget all recorded keys
    fn on_clear(&mut self) {}
}

/// Keep everything for the lifetime of the cache
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn on_insert(&mut self, _key: CacheKey) -> Vec<CacheKey> {
        Vec::new()
    }
}

/// Keep at most `capacity` entries, dropping the least recently used
///
/// Each touch stamps the key with a fresh tick; the oldest tick is the next
/// victim. Touches and evictions are logarithmic in the number of keys.
#[derive(Debug, Clone)]
pub struct LruEviction {
    capacity: usize,
    tick: u64,
    last_used: HashMap<CacheKey, u64>,
    order: BTreeMap<u64, CacheKey>,
}

impl LruEviction {
    /// Bound the cache to `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            last_used: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    /// Number of keys being tracked
    pub fn len(&self) -> usize {
        self.last_used.len()
    }

    /// Whether no keys are tracked
    pub fn is_empty(&self) -> bool {
        self.last_used.is_empty()
    }

    fn touch(&mut self, key: CacheKey) {
        self.tick += 1;
        if let Some(previous) = self.last_used.insert(key, self.tick) {
            self.order.remove(&previous);
        }
        self.order.insert(self.tick, key);
    }
}

impl EvictionPolicy for LruEviction {
    fn on_insert(&mut self, key: CacheKey) -> Vec<CacheKey> {
        self.touch(key);
        let mut victims = Vec::new();
        while self.last_used.len() > self.capacity {
            let Some((_, victim)) = self.order.pop_first() else {
                break;
            };
            self.last_used.remove(&victim);
            victims.push(victim);
        }
        victims
    }

    fn on_hit(&mut self, key: &CacheKey) {
        if self.last_used.contains_key(key) {
            self.touch(*key);
        }
    }

    fn on_clear(&mut self) {
        self.last_used.clear();
        self.order.clear();
    }
}

/// Cache traffic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
}

#[derive(Debug)]
struct CacheEntry {
    series_bits: Vec<u64>,
    outcome: ForecastOutcome,
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    policy: Box<dyn EvictionPolicy>,
    stats: CacheStats,
}

/// Thread-safe store of forecast outcomes
#[derive(Debug)]
pub struct ForecastCache {
    state: Mutex<CacheState>,
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastCache {
    /// Unbounded cache
    pub fn new() -> Self {
        Self::with_policy(NeverEvict)
    }

    /// Cache governed by an eviction policy
    pub fn with_policy<P: EvictionPolicy + 'static>(policy: P) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                policy: Box::new(policy),
                stats: CacheStats::default(),
            }),
        }
    }

    /// Cache bounded to `capacity` entries when given, unbounded otherwise
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::with_policy(LruEviction::new(capacity)),
            None => Self::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Entries are only ever replaced whole, so a poisoned lock holds no torn state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up the outcome for `series` and `horizon`
    pub fn get(&self, series: &[f64], horizon: usize) -> Option<ForecastOutcome> {
        let key = CacheKey::new(series, horizon);
        let mut state = self.lock();

        let outcome = state
            .entries
            .get(&key)
            .filter(|entry| same_bits(&entry.series_bits, series))
            .map(|entry| entry.outcome.clone());

        match outcome {
            Some(outcome) => {
                state.stats.hits += 1;
                state.policy.on_hit(&key);
                trace!(horizon, len = series.len(), "forecast cache hit");
                Some(outcome)
            }
            None => {
                state.stats.misses += 1;
                trace!(horizon, len = series.len(), "forecast cache miss");
                None
            }
        }
    }

    /// Store the outcome for `series` and `horizon`
    pub fn insert(&self, series: &[f64], horizon: usize, outcome: ForecastOutcome) {
        let key = CacheKey::new(series, horizon);
        let mut state = self.lock();

        state.entries.insert(
            key,
            CacheEntry {
                series_bits: series.iter().map(|v| v.to_bits()).collect(),
                outcome,
            },
        );
        state.stats.insertions += 1;

        let victims = state.policy.on_insert(key);
        for victim in victims {
            if state.entries.remove(&victim).is_some() {
                state.stats.evictions += 1;
            }
        }
    }

    /// Drop every entry; counters are kept
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.policy.on_clear();
    }

    /// Number of cached outcomes
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache holds nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the traffic counters
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }
}

fn same_bits(bits: &[u64], series: &[f64]) -> bool {
    bits.len() == series.len() && bits.iter().zip(series).all(|(b, v)| *b == v.to_bits())
}
