//! Time-bounded key/value caching
//!
//! Handlers receive the cache through application state, so the in-process
//! [`MemoryCache`] can be swapped for a shared backend without touching
//! request code.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// A cached value with its bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// Stored value
    pub value: V,
    /// When the value was stored
    pub cached_at: DateTime<Utc>,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            cached_at: Utc::now(),
            expires_at: Instant::now() + ttl,
        }
    }

    /// Whether the entry has outlived its TTL
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Key/value cache with per-entry expiry
#[async_trait]
pub trait TtlCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Fetch a live entry; expired entries are reported as absent
    async fn get(&self, key: &str) -> Option<CacheEntry<V>>;

    /// Store `value` under `key` for `ttl`
    async fn put(&self, key: &str, value: V, ttl: Duration);
}

/// In-process cache backed by a concurrent map
///
/// Expired entries are evicted when they are read, and every write sweeps
/// all expired entries so distinct keys cannot accumulate.
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
}

impl<V> MemoryCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored entries, including ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired cache entries");
        }
        removed
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl<V> TtlCache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.get(key).map(|e| e.value().clone())?;
        if entry.is_expired() {
            self.entries.remove_if(key, |_, e| e.is_expired());
            tracing::debug!(key, "Evicted expired cache entry");
            return None;
        }
        Some(entry)
    }

    async fn put(&self, key: &str, value: V, ttl: Duration) {
        self.purge_expired();
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
    }
}
