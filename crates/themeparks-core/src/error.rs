//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing core objects.
///
/// These indicate a programming or configuration mistake rather than a
/// transient condition, so callers are expected to fail fast on them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A required identifier was missing or empty.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// The timezone name is not a known IANA zone.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

impl CoreError {
    /// Creates a missing field error.
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}
