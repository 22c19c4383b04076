//! TTL memo cache for whole reconciliation calls.
//!
//! The UI re-invokes reconciliation on every render; repeating identical
//! calls within the TTL must not re-issue network requests against
//! rate-limited sources. Entries hold the serialized result map keyed by
//! the full call signature.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    default_ttl: Duration,
}

impl CacheInner {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.body.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, body: String) {
        let expires_at = Instant::now() + self.default_ttl;
        self.map.insert(key, CacheEntry { body, expires_at });
    }
}

/// Thread-safe string-keyed TTL cache.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl CacheStore {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                default_ttl,
            })),
        }
    }

    /// Cache that never stores anything (TTL zero).
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Non-expired entry for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Store `body` under `key`; no-op when the cache is disabled.
    pub async fn put(&self, key: String, body: String) {
        let mut store = self.inner.write().await;
        if store.default_ttl == Duration::ZERO {
            return;
        }
        store.put(key, body);
    }

    /// Drop expired entries.
    pub async fn purge_expired(&self) {
        let now = Instant::now();
        let mut store = self.inner.write().await;
        store.map.retain(|_, entry| entry.expires_at > now);
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
