//! Cache-aside orchestrator.
//!
//! [`Cache`] turns an expensive fetch into a get-or-compute call. A hit is
//! returned as-is (no revalidation); a miss runs the compute future and
//! writes its result back. The cache is best effort: a store that fails on
//! read behaves like an empty one, and a failed write is only logged.
//!
//! Keys are namespaced. Global keys look like `themeparks_<key>`; a cache
//! scoped to a park uses `themeparks_<park>_<key>`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::store::{CacheStore, MemoryStore};

/// How long a computed value stays cached.
pub enum Ttl {
    /// The configured default.
    Default,
    /// A fixed duration.
    Fixed(Duration),
    /// Evaluated after the compute future resolves, for TTLs only known
    /// from the fetched payload (e.g. a token's declared expiry).
    Computed(Box<dyn FnOnce() -> Option<Duration> + Send>),
}

impl Ttl {
    /// A fixed TTL in seconds.
    pub fn secs(secs: u64) -> Self {
        Self::Fixed(Duration::from_secs(secs))
    }

    /// A TTL computed after the value is fetched.
    pub fn computed<F>(ttl: F) -> Self
    where
        F: FnOnce() -> Option<Duration> + Send + 'static,
    {
        Self::Computed(Box::new(ttl))
    }

    /// Resolves to a concrete duration; zero or missing falls back to
    /// `default`.
    pub fn resolve(self, default: Duration) -> Duration {
        let ttl = match self {
            Self::Default => None,
            Self::Fixed(ttl) => Some(ttl),
            Self::Computed(ttl) => ttl(),
        };
        ttl.filter(|ttl| !ttl.is_zero()).unwrap_or(default)
    }
}

impl fmt::Debug for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Fixed(ttl) => f.debug_tuple("Fixed").field(ttl).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        Self::Fixed(ttl)
    }
}

/// Result of [`Cache::lookup_or_compute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Served from the cache.
    Hit(T),
    /// Freshly computed.
    Computed(T),
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Hit(value) | Self::Computed(value) => value,
        }
    }
}

/// Cache-aside orchestrator over a shared [`CacheStore`].
///
/// Cloning is cheap; clones and scoped views share the same store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    config: Arc<CacheConfig>,
    scope: Option<String>,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl Cache {
    /// Creates an unscoped cache over `store`.
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config: Arc::new(config),
            scope: None,
        })
    }

    /// Creates a cache backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: CacheConfig) -> CacheResult<Self> {
        let store = MemoryStore::from_config(&config)?;
        Self::new(Arc::new(store), config)
    }

    /// Returns a view whose scoped keys are prefixed with `scope`.
    pub fn scoped(&self, scope: impl Into<String>) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            scope: Some(scope.into()),
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Full store key for a scoped call.
    pub fn key(&self, key: &str) -> String {
        match &self.scope {
            Some(scope) => format!("{}_{}_{}", self.config.namespace, scope, key),
            None => self.global_key(key),
        }
    }

    /// Full store key for a global call.
    pub fn global_key(&self, key: &str) -> String {
        format!("{}_{}", self.config.namespace, key)
    }

    /// Reads a scoped value. Errors and unreadable values are misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read(&self.key(key)).await
    }

    /// Reads a global value.
    pub async fn get_global<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read(&self.global_key(key)).await
    }

    /// Writes a scoped value.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Ttl) -> CacheResult<()> {
        let ttl = ttl.resolve(self.config.default_ttl);
        self.write(&self.key(key), value, ttl).await
    }

    /// Writes a global value.
    pub async fn set_global<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Ttl,
    ) -> CacheResult<()> {
        let ttl = ttl.resolve(self.config.default_ttl);
        self.write(&self.global_key(key), value, ttl).await
    }

    /// Removes a scoped value.
    pub async fn remove(&self, key: &str) -> CacheResult<()> {
        self.store.remove(&self.key(key)).await
    }

    /// Returns the cached value for a scoped key, computing and caching it
    /// on a miss. Compute errors propagate and nothing is cached.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        compute: F,
        ttl: Ttl,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.lookup_or_compute(key, compute, ttl)
            .await
            .map(Lookup::into_inner)
    }

    /// Like [`Cache::get_or_compute`], but on a global key shared by all
    /// scopes.
    pub async fn get_or_compute_global<T, E, F, Fut>(
        &self,
        key: &str,
        compute: F,
        ttl: Ttl,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.resolve(self.global_key(key), compute, ttl)
            .await
            .map(Lookup::into_inner)
    }

    /// Like [`Cache::get_or_compute`], but reports whether the value came
    /// from the cache.
    pub async fn lookup_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        compute: F,
        ttl: Ttl,
    ) -> Result<Lookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.resolve(self.key(key), compute, ttl).await
    }

    async fn resolve<T, E, F, Fut>(
        &self,
        full_key: String,
        compute: F,
        ttl: Ttl,
    ) -> Result<Lookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.read(&full_key).await {
            return Ok(Lookup::Hit(value));
        }

        let value = compute().await?;
        let ttl = ttl.resolve(self.config.default_ttl);
        if let Err(e) = self.write(&full_key, &value, ttl).await {
            warn!(key = %full_key, error = %e, "Failed to write cache entry");
        }
        Ok(Lookup::Computed(value))
    }

    async fn read<T: DeserializeOwned>(&self, full_key: &str) -> Option<T> {
        match self.store.get(full_key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(value) => {
                    trace!(key = %full_key, "Cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(key = %full_key, error = %e, "Ignoring unreadable cache entry");
                    None
                }
            },
            Ok(None) => {
                trace!(key = %full_key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key = %full_key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn write<T: Serialize>(
        &self,
        full_key: &str,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        let value = serde_json::to_value(value)?;
        self.store.set(full_key, value, Some(ttl)).await?;
        debug!(key = %full_key, ttl_secs = ttl.as_secs(), "Cached value");
        Ok(())
    }
}
