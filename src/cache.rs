//! Time-bounded in-memory cache for read-mostly API responses

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// A map whose entries are valid only for `ttl` after they were stored.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, Entry<V>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh value. Stale entries are dropped on access.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let fresh = self
            .entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;
        if fresh {
            self.entries.get(key).map(|entry| entry.value.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    /// Store a value, restarting its time window
    pub fn insert(&mut self, key: &str, value: V) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop one entry
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry whose key starts with `prefix`
    pub fn invalidate_prefix(&mut self, prefix: &str) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Drop all stale entries, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - self.entries.len()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared response cache keyed by request path
pub struct ResponseCache {
    inner: Mutex<TtlCache<Value>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(TtlCache::new(ttl)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key)
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.lock().insert(key, value);
    }

    pub fn invalidate_prefix(&self, prefix: &str) {
        self.lock().invalidate_prefix(prefix);
    }

    pub fn purge_expired(&self) -> usize {
        self.lock().purge_expired()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TtlCache<Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let mut cache = TtlCache::new(Duration::from_secs(300));
        cache.insert("/api/categories", vec!["phones"]);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("/api/categories"), Some(vec!["phones"]));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("/api/categories"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reinsert_restarts_window() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", 1);
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.insert("k", 2);
        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_and_prefix_invalidation() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.insert("/api/banners", Value::Null);
        cache.insert("/api/banners/b1", Value::Null);
        cache.insert("/api/services", Value::Bool(true));

        cache.invalidate_prefix("/api/banners");
        assert!(cache.get("/api/banners").is_none());
        assert_eq!(cache.get("/api/services"), Some(Value::Bool(true)));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.purge_expired(), 1);
    }
}
