//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache counters.
///
/// Counters only grow until [`reset`](CacheStats::reset) starts a new epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the cache
    pub size: usize,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries removed by expiry, invalidation, clearing or capacity
    pub evictions: u64,
    /// hits + misses
    pub total_requests: u64,
    /// hits / total_requests * 100, rounded to two decimals
    pub hit_rate_percent: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Percentage of lookups that were hits, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
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
    /// Increments the eviction counter by `count`.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Reset ==
    /// Zeroes the counters, keeping the size.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    // == Snapshot ==
    /// Returns a copy with the derived fields filled in.
    pub fn snapshot(&self, size: usize) -> Self {
        let hit_rate = (self.hit_rate() * 100.0).round() / 100.0;
        Self {
            size,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            total_requests: self.hits + self.misses,
            hit_rate_percent: hit_rate,
        }
    }
}
