//! LRU Tracker Module
//!
//! Recency bookkeeping for the optional capacity bound of the cache.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks key access order with a monotonically increasing tick.
///
/// `by_tick` is ordered oldest first, so the least recently used key is its
/// first entry. Both maps always hold the same set of keys.
#[derive(Debug, Default)]
pub struct LruTracker {
    tick: u64,
    by_key: HashMap<String, u64>,
    by_tick: BTreeMap<u64, String>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if new.
    pub fn touch(&mut self, key: &str) {
        self.tick += 1;
        if let Some(previous) = self.by_key.insert(key.to_string(), self.tick) {
            self.by_tick.remove(&previous);
        }
        self.by_tick.insert(self.tick, key.to_string());
    }

    // == Remove ==
    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.by_key.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Pop Least Recent ==
    /// Removes and returns the least recently used key.
    pub fn pop_least_recent(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.by_key.remove(&key);
        Some(key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.by_key.clear();
        self.by_tick.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let lru = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn test_lru_pop_in_insertion_order() {
        let mut lru = LruTracker::new();
        lru.touch("list-jobs:");
        lru.touch("list-nodes:");
        lru.touch("list-jobs:api");

        assert_eq!(lru.pop_least_recent().as_deref(), Some("list-jobs:"));
        assert_eq!(lru.pop_least_recent().as_deref(), Some("list-nodes:"));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_touch_refreshes_recency() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.pop_least_recent().as_deref(), Some("b"));
        assert_eq!(lru.pop_least_recent().as_deref(), Some("c"));
        assert_eq!(lru.pop_least_recent().as_deref(), Some("a"));
        assert_eq!(lru.pop_least_recent(), None);
    }

    #[test]
    fn test_lru_remove_and_clear() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");

        lru.remove("a");
        lru.remove("missing");
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.pop_least_recent().as_deref(), Some("b"));

        lru.touch("c");
        lru.clear();
        assert!(lru.is_empty());
    }
}
