//! Cache stores.
//!
//! A [`CacheStore`] is the external key/value collaborator the orchestrator
//! talks to. Values are JSON documents; every entry may carry its own TTL.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde_json::Value;
use themeparks_core::BoxFuture;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

/// Key/value store with per-entry expiry.
pub trait CacheStore: Send + Sync {
    /// Returns the value for `key`, or `None` if missing or expired.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, CacheResult<Option<Value>>>;

    /// Stores `value` under `key`. `None` keeps it until evicted.
    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Value,
        ttl: Option<Duration>,
    ) -> BoxFuture<'a, CacheResult<()>>;

    /// Removes `key` if present.
    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, CacheResult<()>>;
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    /// A TTL too large to represent as an instant never expires.
    fn new(value: Value, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }
}

/// In-process store with LRU eviction.
///
/// Expired entries are dropped lazily when read, or in bulk by
/// [`MemoryStore::evict_expired`].
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<LruCache<String, StoredEntry>>,
}

impl MemoryStore {
    /// Creates a store holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> CacheResult<Self> {
        let capacity = NonZeroUsize::new(max_entries)
            .ok_or_else(|| CacheError::config("max entries must be greater than zero"))?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Creates a store sized from `config`.
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        Self::new(config.max_entries)
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Time left before `key` expires. `None` if missing, expired or
    /// stored without a TTL.
    pub async fn time_until_expiry(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().await;
        let expires_at = entries.peek(key)?.expires_at?;
        let left = expires_at.saturating_duration_since(Instant::now());
        (!left.is_zero()).then_some(left)
    }

    /// Drops every expired entry. Returns the number removed.
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            trace!(key = %key, "Evicting expired cache entry");
            entries.pop(key);
        }
        if !expired.is_empty() {
            debug!(evicted = expired.len(), "Evicted expired cache entries");
        }
        expired.len()
    }
}

impl CacheStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, CacheResult<Option<Value>>> {
        Box::pin(async move {
            let mut entries = self.entries.lock().await;
            let Some(entry) = entries.get(key) else {
                return Ok(None);
            };
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
            entries.pop(key);
            trace!(key = %key, "Dropped expired cache entry");
            Ok(None)
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Value,
        ttl: Option<Duration>,
    ) -> BoxFuture<'a, CacheResult<()>> {
        Box::pin(async move {
            let mut entries = self.entries.lock().await;
            if let Some((evicted, _)) = entries.push(key.to_string(), StoredEntry::new(value, ttl))
            {
                if evicted != key {
                    debug!(key = %evicted, "Evicted least recently used cache entry");
                }
            }
            trace!(key = %key, ttl_secs = ttl.map(|ttl| ttl.as_secs()), "Stored cache entry");
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, CacheResult<()>> {
        Box::pin(async move {
            if self.entries.lock().await.pop(key).is_some() {
                debug!(key = %key, "Removed cache entry");
            }
            Ok(())
        })
    }
}
