//! Cache Store Module
//!
//! Synchronous cache engine: HashMap storage with TTL expiry, hit/miss/eviction
//! counters and an optional LRU capacity bound. Callers share it through
//! [`TtlCache`](super::TtlCache), which serializes access.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Entry Info ==
/// Per-entry view returned by [`CacheStore::info`].
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub key: String,
    pub age_seconds: f64,
    pub ttl_seconds: f64,
    pub expires_in_seconds: f64,
    pub is_expired: bool,
    pub cached_at: DateTime<Utc>,
}

// == Cache Store ==
/// Main cache storage with TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker, only consulted when a capacity is set
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries, None = unbounded
    max_entries: Option<usize>,
    /// Bumped by every invalidation and clear, whether or not anything matched
    generation: u64,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity bound; `None` (or `Some(0)`) disables it
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.filter(|max| *max > 0),
            generation: 0,
        }
    }

    // == Generation ==
    /// Invalidation epoch; pair with [`set_if_current`](Self::set_if_current).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // == Conditional Set ==
    /// Stores the value only if no invalidation happened since `generation`
    /// was read. Returns whether it was stored.
    pub fn set_if_current(&mut self, key: String, value: V, ttl: Duration, generation: u64) -> bool {
        if self.generation != generation {
            debug!("Discarded stale value for {}", key);
            return false;
        }
        self.set(key, value, ttl);
        true
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry and resetting its TTL.
    ///
    /// When a capacity is set and a new key would exceed it, the least
    /// recently used entry is evicted first.
    pub fn set(&mut self, key: String, value: V, ttl: Duration) {
        if let Some(max) = self.max_entries {
            if !self.entries.contains_key(&key) && self.entries.len() >= max {
                if let Some(evicted) = self.lru.pop_least_recent() {
                    self.entries.remove(&evicted);
                    self.stats.record_evictions(1);
                    debug!("Cache capacity reached, evicted: {}", evicted);
                }
            }
        }

        self.lru.touch(&key);
        let entry = CacheEntry::new(key.clone(), value, ttl);
        self.entries.insert(key.clone(), entry);
        debug!("Cached: {} (ttl: {:?})", key, ttl);
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry is removed and counted as both an eviction and a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                debug!("Cache miss: {}", key);
                return None;
            }
            Some(entry) => entry.is_expired(),
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_evictions(1);
            self.stats.record_miss();
            debug!("Cache expired: {}", key);
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        let entry = self.entries.get(key)?;
        debug!(
            "Cache hit: {} (age: {:.1}s, ttl: {:?})",
            key,
            entry.age().as_secs_f64(),
            entry.ttl
        );
        Some(entry.value.clone())
    }

    // == Invalidate ==
    /// Removes one entry. Returns whether it existed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.generation += 1;
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            self.stats.record_evictions(1);
            debug!("Invalidated: {}", key);
            true
        } else {
            false
        }
    }

    // == Invalidate Pattern ==
    /// Removes every entry whose key contains `pattern` as a plain substring.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> usize {
        self.generation += 1;
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        self.stats.record_evictions(matching.len());

        if !matching.is_empty() {
            debug!(
                "Invalidated {} entries matching '{}'",
                matching.len(),
                pattern
            );
        }
        matching.len()
    }

    // == Clear ==
    /// Empties the store and returns the prior size.
    pub fn clear(&mut self) -> usize {
        self.generation += 1;
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.stats.record_evictions(count);
        info!("Cache cleared: {} entries removed", count);
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        self.stats.record_evictions(expired_keys.len());

        expired_keys.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    // == Reset Stats ==
    /// Starts a new counting epoch without touching the entries.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        debug!("Cache statistics reset");
    }

    // == Keys ==
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    // == Info ==
    /// Per-entry details, sorted by key.
    pub fn info(&self) -> Vec<EntryInfo> {
        let mut entries: Vec<EntryInfo> = self
            .entries
            .values()
            .map(|entry| EntryInfo {
                key: entry.key.clone(),
                age_seconds: round2(entry.age().as_secs_f64()),
                ttl_seconds: entry.ttl.as_secs_f64(),
                expires_in_seconds: round2(entry.time_until_expiry()),
                is_expired: entry.is_expired(),
                cached_at: entry.cached_at,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
