//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's counting and invalidation invariants.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::cache::CacheStore;

// == Test Configuration ==
const LONG_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates cache keys shaped like dispatcher keys
fn key_strategy() -> impl Strategy<Value = String> {
    "(list-jobs|list-nodes|job):[a-z0-9_-]{0,12}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Invalidate { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits and misses match a model map, and the hit rate follows from them.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = CacheStore::new(None);
        let mut model: HashMap<String, String> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    model.insert(key.clone(), value.clone());
                    store.set(key, value, LONG_TTL);
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key);
                    prop_assert_eq!(got.as_ref(), model.get(&key));
                    if got.is_some() {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                }
                CacheOp::Invalidate { key } => {
                    prop_assert_eq!(store.invalidate(&key), model.remove(&key).is_some());
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_requests, expected_hits + expected_misses);
        prop_assert_eq!(stats.size, model.len());

        let expected_rate = if expected_hits + expected_misses == 0 {
            0.0
        } else {
            100.0 * expected_hits as f64 / (expected_hits + expected_misses) as f64
        };
        prop_assert!((stats.hit_rate_percent - expected_rate).abs() <= 0.005 + f64::EPSILON);
    }

    // invalidate_pattern removes exactly the keys containing the pattern.
    #[test]
    fn prop_invalidate_pattern_exact(
        keys in prop::collection::hash_set(key_strategy(), 1..40),
        pattern in "[a-z:-]{1,6}"
    ) {
        let mut store = CacheStore::new(None);
        for key in &keys {
            store.set(key.clone(), 0u8, LONG_TTL);
        }

        let expected_removed: HashSet<&String> =
            keys.iter().filter(|k| k.contains(pattern.as_str())).collect();

        let removed = store.invalidate_pattern(&pattern);
        prop_assert_eq!(removed, expected_removed.len());

        let remaining: HashSet<String> = store.keys().into_iter().collect();
        for key in &keys {
            prop_assert_eq!(remaining.contains(key), !expected_removed.contains(key));
        }
    }

    // With a bound, the store never grows past it.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200),
        max in 1usize..30
    ) {
        let mut store = CacheStore::new(Some(max));
        for (key, value) in entries {
            store.set(key, value, LONG_TTL);
            prop_assert!(store.len() <= max, "size {} exceeds max {}", store.len(), max);
        }
    }

    // Set then get returns the stored value; overwrite returns the new one.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = CacheStore::new(None);
        store.set(key.clone(), value1.clone(), LONG_TTL);
        prop_assert_eq!(store.get(&key), Some(value1));

        store.set(key.clone(), value2.clone(), LONG_TTL);
        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1);
    }
}

// Fewer cases for the time-sensitive expiry property
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(None);
        store.set(key.clone(), value.clone(), Duration::from_millis(30));

        prop_assert_eq!(store.get(&key), Some(value));

        std::thread::sleep(Duration::from_millis(50));

        let evictions_before = store.stats().evictions;
        prop_assert!(store.get(&key).is_none());
        prop_assert_eq!(store.stats().evictions, evictions_before + 1);
    }
}
