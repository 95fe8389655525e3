//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Monotonic creation instant, used for expiry
    pub created_at: Instant,
    /// Wall-clock creation time, for reporting
    pub cached_at: DateTime<Utc>,
    /// Time to live
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(key: impl Into<String>, value: V, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value,
            created_at: Instant::now(),
            cached_at: Utc::now(),
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once its age is greater than or equal to its TTL,
    /// so a zero TTL entry is expired immediately.
    pub fn is_expired(&self) -> bool {
        self.age() >= self.ttl
    }

    // == Age ==
    /// Time elapsed since the entry was stored.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    // == Time Until Expiry ==
    /// Remaining lifetime in seconds, negative once expired.
    pub fn time_until_expiry(&self) -> f64 {
        self.ttl.as_secs_f64() - self.age().as_secs_f64()
    }
}
