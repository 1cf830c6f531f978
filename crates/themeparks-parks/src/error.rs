//! Error types for adapters and the fetch coordinator.
//!
//! Adapters report [`AdapterError`]s. The coordinator wraps them in a
//! [`ParkError`] naming the operation that failed, so a caller always sees a
//! single terminal error per request.

use std::fmt;

use thiserror::Error;

use themeparks_core::CoreError;

/// The category of an adapter error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterErrorCode {
    /// The source timed out or the read was interrupted.
    NetworkError,
    /// The payload could not be parsed.
    InvalidResponse,
    /// The data source does not exist.
    NotFound,
    /// The adapter is misconfigured.
    ConfigurationError,
    /// The adapter does not implement this operation.
    Unsupported,
    /// Unexpected adapter state.
    InternalError,
}

impl AdapterErrorCode {
    /// Returns true if the same request may succeed when repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::ConfigurationError => "configuration_error",
            Self::Unsupported => "unsupported",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for AdapterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised by a park adapter while fetching.
#[derive(Debug, Error)]
pub struct AdapterError {
    code: AdapterErrorCode,
    message: String,
    /// Park that produced the error.
    park: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AdapterError {
    pub fn new(code: AdapterErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            park: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::NetworkError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::NotFound, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::ConfigurationError, message)
    }

    /// Creates an error for an operation the adapter does not implement.
    pub fn unsupported(operation: &str) -> Self {
        Self::new(
            AdapterErrorCode::Unsupported,
            format!("{} are not supported by this adapter", operation),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorCode::InternalError, message)
    }

    /// Sets the park that produced this error.
    pub fn with_park(mut self, park: impl Into<String>) -> Self {
        self.park = Some(park.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> AdapterErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn park(&self) -> Option<&str> {
        self.park.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref park) = self.park {
            write!(f, "[{}] ", park)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result type for adapter fetches.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors returned to callers of the fetch coordinator.
#[derive(Debug, Error)]
pub enum ParkError {
    /// The park's adapter does not offer this data.
    #[error("{park} does not support {operation}")]
    Unsupported {
        park: String,
        operation: &'static str,
    },

    /// The adapter failed to fetch wait times.
    #[error("Error fetching park wait times: {source}")]
    WaitTimes {
        park: String,
        #[source]
        source: AdapterError,
    },

    /// The adapter failed to fetch opening times.
    #[error("Error fetching park opening times: {source}")]
    OpeningTimes {
        park: String,
        #[source]
        source: AdapterError,
    },

    /// Invalid settings.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid park metadata.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ParkError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns the adapter error behind a failed fetch.
    pub fn adapter_error(&self) -> Option<&AdapterError> {
        match self {
            Self::WaitTimes { source, .. } | Self::OpeningTimes { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for fetch coordinator operations.
pub type ParkResult<T> = Result<T, ParkError>;
