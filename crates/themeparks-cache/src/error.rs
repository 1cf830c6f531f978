//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by cache stores.
///
/// The orchestrator never lets these fail a request: read errors become
/// misses and write errors are logged.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store failed.
    #[error("Cache backend error: {message}")]
    Backend { message: String },

    /// A value could not be converted to or from JSON.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid cache configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CacheError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
