//! Cache configuration.

use std::time::Duration;

use crate::error::{CacheError, CacheResult};

/// Global key prefix.
pub const DEFAULT_NAMESPACE: &str = "themeparks";

/// Cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL used when a call does not resolve one of its own.
    pub default_ttl: Duration,

    /// Maximum entries held by the in-memory store.
    pub max_entries: usize,

    /// Prefix applied to every key.
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            max_entries: 5000,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl CacheConfig {
    /// Builder: set the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Builder: set the entry limit.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Builder: set the key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Checks the values are usable.
    pub fn validate(&self) -> CacheResult<()> {
        if self.default_ttl.is_zero() {
            return Err(CacheError::config("default TTL must be greater than zero"));
        }
        if self.max_entries == 0 {
            return Err(CacheError::config("max entries must be greater than zero"));
        }
        if self.namespace.is_empty() {
            return Err(CacheError::config("namespace must not be empty"));
        }
        Ok(())
    }
}
