//! Lazy Value Statistics Module
//!
//! Tracks how often values were served from cache, loaded, or defaulted.

use serde::Serialize;

// == Lazy Stats ==
/// Counters describing the activity of one lazy value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LazyStats {
    /// Number of gets answered from the cache
    pub hits: u64,
    /// Number of gets that found no fresh cached value
    pub misses: u64,
    /// Number of loader calls that succeeded
    pub loads: u64,
    /// Number of loader calls that failed
    pub load_failures: u64,
    /// Number of zero values served because no loader is configured
    pub fallbacks: u64,
    /// Number of single-key removals plus full clears
    pub invalidations: u64,
    /// Current number of cached values
    pub total_entries: usize,
}

impl LazyStats {
    // == Constructor ==
    /// Creates a new LazyStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_load(&mut self) {
        self.loads += 1;
    }

    pub fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
