//! Cache Statistics Module
//!
//! Tracks cache performance counters including hits, misses, and evictions.
//! Counters cover the current alert window and are reset when it closes.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (absent, expired or early-expired)
    pub misses: u64,
    /// Number of entries evicted for capacity or expiry
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate for reporting.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        self.hit_ratio().unwrap_or(0.0)
    }

    // == Hit Ratio ==
    /// Hit ratio of the window, or None when there were no reads.
    pub fn hit_ratio(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        if total == 0 {
            None
        } else {
            Some(self.hits as f64 / total as f64)
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.record_evictions(1);
    }

    /// Adds a batch of evictions, as reported by a sweep.
    pub fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }

    // == Reset Window ==
    /// Zeroes hits, misses and evictions, returning their values.
    ///
    /// `total_entries` describes the store, not the window, and is kept.
    pub fn reset_window(&mut self) -> CacheStats {
        let snapshot = self.clone();
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
        snapshot
    }
}
