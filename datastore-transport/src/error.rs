//! Transport error types.
//!
//! Every failure leaving the transport is tagged exactly once, here, as either
//! transient (worth retrying) or not. Callers match on the variant instead of
//! digging through error sources.

use crate::RawResponse;
use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The round trip did not complete within the configured timeout.
    #[error("Request timed out after {elapsed:?}: {message}")]
    Timeout {
        /// Time spent before the transport gave up.
        elapsed: Duration,
        /// Underlying error message.
        message: String,
    },

    /// The engine answered, but the transport treats the status as a failure.
    ///
    /// The structured response is handed back so the caller can classify it.
    #[error("Engine responded with status {}", .0.status_label())]
    Status(RawResponse),

    /// Connection could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid node URL or resource path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The client could not be constructed.
    #[error("Failed to build transport: {0}")]
    Build(String),

    /// Any other failure during the round trip.
    #[error("Transport failure: {0}")]
    Fatal(String),
}

impl TransportError {
    /// Build a timeout error.
    pub fn timeout(elapsed: Duration, message: impl Into<String>) -> Self {
        Self::Timeout {
            elapsed,
            message: message.into(),
        }
    }

    /// Check if this error is transient and the round trip may be retried.
    ///
    /// Only timeouts qualify. Connection failures are surfaced immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Get the structured response carried by a status error.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Self::Status(response) => Some(response),
            _ => None,
        }
    }

    /// Classify a `reqwest` failure at the boundary.
    pub(crate) fn from_reqwest(error: reqwest::Error, elapsed: Duration) -> Self {
        if error.is_timeout() {
            Self::timeout(elapsed, error.to_string())
        } else if error.is_connect() {
            Self::Connection(error.to_string())
        } else if error.is_builder() {
            Self::Build(error.to_string())
        } else {
            Self::Fatal(error.to_string())
        }
    }
}

impl From<url::ParseError> for TransportError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}
