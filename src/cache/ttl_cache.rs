//! Shared TTL Cache
//!
//! Async handle over [`CacheStore`]. Every call takes the store's lock for the
//! map operation only; `get_or_fetch` releases it while the fetch runs, so a
//! slow remote call never blocks unrelated keys.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::{CacheStats, CacheStore, EntryInfo};

/// Cloneable handle to one cache instance.
#[derive(Debug)]
pub struct TtlCache<V> {
    store: Arc<Mutex<CacheStore<V>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<V: Clone + Send> TtlCache<V> {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            store: Arc::new(Mutex::new(CacheStore::new(max_entries))),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.store.lock().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.store.lock().await.set(key.into(), value, ttl);
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.lock().await.invalidate(key)
    }

    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        self.store.lock().await.invalidate_pattern(pattern)
    }

    pub async fn clear(&self) -> usize {
        self.store.lock().await.clear()
    }

    pub async fn cleanup_expired(&self) -> usize {
        self.store.lock().await.cleanup_expired()
    }

    /// Returns the cached value, or runs `fetch` and caches its result.
    ///
    /// Concurrent misses on the same key each run their own fetch; the last
    /// one to finish wins. A failed fetch caches nothing, and neither does a
    /// fetch that overlapped an invalidation: its result may predate the
    /// change the invalidation announced.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F, ttl: Duration) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let generation = self.store.lock().await.generation();
        let value = fetch().await?;
        self.store
            .lock()
            .await
            .set_if_current(key.to_string(), value.clone(), ttl, generation);
        Ok(value)
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    pub async fn reset_stats(&self) {
        self.store.lock().await.reset_stats();
    }

    pub async fn keys(&self) -> Vec<String> {
        self.store.lock().await.keys()
    }

    pub async fn info(&self) -> Vec<EntryInfo> {
        self.store.lock().await.info()
    }
}
