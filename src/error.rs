//! Unified error handling for the hospital-locator library.
//!
//! Callers (the map and details screens) log these and keep whatever was
//! already drawn; no error here should ever crash a screen.

use thiserror::Error;

/// Unified error type for hospital-locator operations.
#[derive(Debug, Clone, Error)]
pub enum LocatorError {
    /// Transport failure or non-2xx response from the routing service
    #[error("network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
    },
    /// Routing response body did not match the expected shape
    #[error("parse error: {message}")]
    Parse { message: String },
    /// Hospital dataset failed to deserialize
    #[error("dataset error: {message}")]
    Dataset { message: String },
}

impl LocatorError {
    pub(crate) fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub(crate) fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }
}

/// Result type alias for hospital-locator operations.
pub type Result<T> = std::result::Result<T, LocatorError>;
