//! Cache State Module
//!
//! Unsynchronized storage behind every lazy value: cached values, their
//! computation timestamps and the running statistics. Callers wrap it in a
//! lock; nothing here is shared directly.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::cache::{ExpiryPolicy, LazyStats};

// == Lookup Outcome ==
/// Result of checking the cache before a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// A fresh cached value.
    Fresh(T),
    /// Nothing usable is cached; `expired` is true when a stale value was
    /// found.
    Miss { expired: bool },
}

// == Cache State ==
/// Values and timestamps of one lazy value, kept in two parallel maps.
///
/// A timestamp can exist without a value (a failed load in TTL mode) and a
/// value can exist without a timestamp (preloaded, or TTL mode off).
#[derive(Debug)]
pub struct CacheState<K, T> {
    /// Cached values by key
    values: HashMap<K, T>,
    /// Last computation time by key, TTL mode only
    computed: HashMap<K, Instant>,
    /// Activity counters
    stats: LazyStats,
}

impl<K, T> CacheState<K, T>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates an empty state.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            computed: HashMap::new(),
            stats: LazyStats::new(),
        }
    }

    // == Lookups ==
    /// Returns the cached value for `key`, fresh or not.
    pub fn cached(&self, key: &K) -> Option<&T> {
        self.values.get(key)
    }

    /// Returns when `key` was last computed, if recorded.
    pub fn computed_at(&self, key: &K) -> Option<Instant> {
        self.computed.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    // == Store ==
    /// Caches `value` under `key`, replacing any previous value.
    pub fn store(&mut self, key: K, value: T) {
        self.values.insert(key, value);
    }

    // == Seed ==
    /// Caches `value` under `key` with no timestamp, so it never expires
    /// until it is reloaded.
    pub fn seed(&mut self, key: K, value: T) {
        self.computed.remove(&key);
        self.values.insert(key, value);
    }

    // == Stamp ==
    /// Records the computation time of `key`.
    pub fn stamp(&mut self, key: K, at: Instant) {
        self.computed.insert(key, at);
    }

    // == Time Remaining ==
    /// Remaining lifetime of the value cached for `key` under `policy`.
    ///
    /// `None` when nothing is cached, TTL mode is off or the value carries no
    /// timestamp.
    pub fn remaining(&self, key: &K, policy: &ExpiryPolicy) -> Option<Duration> {
        if !self.contains(key) {
            return None;
        }
        policy.remaining(self.computed_at(key))
    }

    // == Remove ==
    /// Drops the value and timestamp of `key`.
    ///
    /// Returns true if a value was cached.
    pub fn remove(&mut self, key: &K) -> bool {
        self.computed.remove(key);
        self.values.remove(key).is_some()
    }

    // == Clear ==
    /// Replaces both maps with empty ones.
    pub fn clear(&mut self) {
        self.values = HashMap::new();
        self.computed = HashMap::new();
    }

    // == Stats ==
    /// Returns a snapshot of the statistics.
    pub fn stats(&self) -> LazyStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.values.len());
        stats
    }

    pub fn stats_mut(&mut self) -> &mut LazyStats {
        &mut self.stats
    }

    // == Length ==
    /// Returns the number of cached values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, T> CacheState<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    // == Lookup ==
    /// Looks up `key` under `policy`, counting a hit or a miss.
    pub fn lookup(&mut self, key: &K, policy: &ExpiryPolicy) -> Lookup<T> {
        let expired = policy.is_expired(self.computed_at(key));
        if !expired {
            if let Some(value) = self.cached(key) {
                let value = value.clone();
                self.stats.record_hit();
                return Lookup::Fresh(value);
            }
        }
        self.stats.record_miss();
        Lookup::Miss { expired }
    }

    // == Record Load ==
    /// Applies the outcome of a load of `key` finished at `at`.
    ///
    /// A success is cached. A failure leaves any previous value in place. The
    /// key is stamped when `policy` says the outcome restarts its clock.
    pub fn record_load<E>(
        &mut self,
        key: &K,
        result: &Result<T, E>,
        policy: &ExpiryPolicy,
        at: Instant,
    ) {
        match result {
            Ok(value) => {
                self.store(key.clone(), value.clone());
                self.stats.record_load();
            }
            Err(_) => self.stats.record_load_failure(),
        }

        if policy.should_stamp(result.is_ok()) {
            self.stamp(key.clone(), at);
        }
    }
}

impl<K, T> Default for CacheState<K, T>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn ago(duration: Duration) -> Instant {
        Instant::now()
            .checked_sub(duration)
            .expect("monotonic clock too close to its origin")
    }

    #[test]
    fn test_state_new() {
        let state: CacheState<String, u32> = CacheState::new();
        assert_eq!(state.len(), 0);
        assert!(state.is_empty());
    }

    #[test]
    fn test_state_seed_has_no_timestamp() {
        let mut state = CacheState::new();
        state.seed("ctx".to_string(), 7u32);

        assert_eq!(state.cached(&"ctx".to_string()), Some(&7));
        assert!(state.computed_at(&"ctx".to_string()).is_none());
    }

    #[test]
    fn test_state_seed_keeps_other_entries() {
        let mut state = CacheState::new();
        state.store("loaded", 1);
        state.stamp("loaded", Instant::now());
        state.stats_mut().record_load();

        state.seed("a", 2);
        state.seed("b", 3);

        assert_eq!(state.len(), 3);
        assert!(state.computed_at(&"loaded").is_some());
        assert_eq!(state.stats().loads, 1);
    }

    #[test]
    fn test_state_seed_clears_old_timestamp() {
        let mut state = CacheState::new();
        state.store("key1", 1);
        state.stamp("key1", Instant::now());

        state.seed("key1", 2);

        assert_eq!(state.cached(&"key1"), Some(&2));
        assert!(state.computed_at(&"key1").is_none());
    }

    #[test]
    fn test_state_lookup_counts_hits_and_misses() {
        let policy = ExpiryPolicy::disabled();
        let mut state: CacheState<&str, u32> = CacheState::new();

        assert_eq!(state.lookup(&"key1", &policy), Lookup::Miss { expired: false });
        state.store("key1", 5);
        assert_eq!(state.lookup(&"key1", &policy), Lookup::Fresh(5));

        let stats = state.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_state_lookup_reports_expired_value() {
        let policy = ExpiryPolicy::ttl(Duration::from_millis(10));
        let mut state = CacheState::new();
        state.store("key1", 5);
        state.stamp("key1", ago(Duration::from_millis(50)));

        assert_eq!(state.lookup(&"key1", &policy), Lookup::Miss { expired: true });
        assert_eq!(state.cached(&"key1"), Some(&5));
    }

    #[test]
    fn test_state_record_load_success() {
        let policy = ExpiryPolicy::ttl(Duration::from_secs(1));
        let mut state = CacheState::new();
        let at = Instant::now();

        state.record_load(&"key1", &Ok::<_, ()>(9), &policy, at);

        assert_eq!(state.cached(&"key1"), Some(&9));
        assert_eq!(state.computed_at(&"key1"), Some(at));
        assert_eq!(state.stats().loads, 1);
    }

    #[test]
    fn test_state_record_load_failure_restarts_clock_by_default() {
        let policy = ExpiryPolicy::ttl(Duration::from_secs(1));
        let mut state = CacheState::new();
        state.store("key1", 1);
        let at = Instant::now();

        state.record_load(&"key1", &Err::<u32, _>("down"), &policy, at);

        assert_eq!(state.cached(&"key1"), Some(&1));
        assert_eq!(state.computed_at(&"key1"), Some(at));
        assert_eq!(state.stats().load_failures, 1);
    }

    #[test]
    fn test_state_record_load_failure_without_reset() {
        let policy = ExpiryPolicy::ttl(Duration::from_secs(1)).reset_on_failure(false);
        let mut state: CacheState<&str, u32> = CacheState::new();

        state.record_load(&"key1", &Err("down"), &policy, Instant::now());

        assert!(state.computed_at(&"key1").is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn test_state_record_load_without_ttl_never_stamps() {
        let mut state = CacheState::new();
        state.record_load(&"key1", &Ok::<_, ()>(1), &ExpiryPolicy::disabled(), Instant::now());

        assert!(state.computed_at(&"key1").is_none());
    }

    #[test]
    fn test_state_remaining() {
        let policy = ExpiryPolicy::ttl(Duration::from_secs(10));
        let mut state = CacheState::new();
        state.seed("seeded", 1);
        state.store("loaded", 2);
        state.stamp("loaded", Instant::now());
        state.stamp("failed", Instant::now());

        assert!(state.remaining(&"seeded", &policy).is_none());
        assert!(state.remaining(&"failed", &policy).is_none());
        assert!(state.remaining(&"loaded", &policy).unwrap() > Duration::from_secs(9));
        assert!(state.remaining(&"loaded", &ExpiryPolicy::disabled()).is_none());
    }

    #[test]
    fn test_state_store_overwrites() {
        let mut state = CacheState::new();
        state.store("key1", "value1");
        state.store("key1", "value2");

        assert_eq!(state.cached(&"key1"), Some(&"value2"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_state_timestamp_without_value() {
        let mut state: CacheState<&str, u32> = CacheState::new();
        state.stamp("key1", Instant::now());

        assert!(state.computed_at(&"key1").is_some());
        assert!(!state.contains(&"key1"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_state_remove_drops_both_maps() {
        let mut state = CacheState::new();
        state.store("key1", 1);
        state.stamp("key1", Instant::now());

        assert!(state.remove(&"key1"));
        assert!(state.cached(&"key1").is_none());
        assert!(state.computed_at(&"key1").is_none());
    }

    #[test]
    fn test_state_remove_nonexistent() {
        let mut state: CacheState<&str, u32> = CacheState::new();
        state.stamp("ghost", Instant::now());

        assert!(!state.remove(&"ghost"));
        assert!(state.computed_at(&"ghost").is_none());
    }

    #[test]
    fn test_state_clear() {
        let mut state = CacheState::new();
        state.store("key1", 1);
        state.store("key2", 2);
        state.stamp("key1", Instant::now());

        state.clear();

        assert!(state.is_empty());
        assert!(state.computed_at(&"key1").is_none());
    }

    #[test]
    fn test_state_stats_snapshot_counts_entries() {
        let mut state = CacheState::new();
        state.store("key1", 1);
        state.store("key2", 2);
        state.stats_mut().record_hit();

        let stats = state.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_entries, 2);
    }
}
