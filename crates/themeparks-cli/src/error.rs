//! CLI error types.

use std::fmt;

use themeparks_cache::CacheError;
use themeparks_core::TracingError;
use themeparks_parks::{AdapterError, ParkError};

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// Logging could not be set up.
    Logging(TracingError),
    /// The feed could not be loaded.
    Adapter(AdapterError),
    /// Cache setup failed.
    Cache(CacheError),
    /// A park operation failed.
    Park(ParkError),
    /// Output could not be rendered.
    Output(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Logging(err) => write!(f, "logging error: {}", err),
            Self::Adapter(err) => write!(f, "feed error: {}", err),
            Self::Cache(err) => write!(f, "cache error: {}", err),
            Self::Park(err) => write!(f, "{}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Adapter(err) => Some(err),
            Self::Cache(err) => Some(err),
            Self::Park(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Config(_) | Self::Output(_) => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<TracingError> for CliError {
    fn from(err: TracingError) -> Self {
        Self::Logging(err)
    }
}

impl From<AdapterError> for CliError {
    fn from(err: AdapterError) -> Self {
        Self::Adapter(err)
    }
}

impl From<CacheError> for CliError {
    fn from(err: CacheError) -> Self {
        Self::Cache(err)
    }
}

impl From<ParkError> for CliError {
    fn from(err: ParkError) -> Self {
        Self::Park(err)
    }
}
