//! Cache Module
//!
//! Request-scoped caching for Jenkins reads: TTL expiry, substring
//! invalidation, hit/miss/eviction statistics and an optional LRU bound.

mod entry;
mod lru;
mod stats;
mod store;
mod ttl_cache;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheStore, EntryInfo};
pub use ttl_cache::TtlCache;

// == Public Constants ==
/// TTL applied to cacheable listing results
pub const DEFAULT_LIST_TTL_SECS: u64 = 30;
