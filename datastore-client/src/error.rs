//! Error types for datastore client operations.

use datastore_transport::{RawResponse, TransportError};
use thiserror::Error;

/// Reason used when the engine response carries no status line.
const UNKNOWN_REASON: &str = "Unknown. Cannot get the reason from Response";

/// Datastore client error type.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Required configuration or collaborator missing at construction.
    #[error("Client initialization failed: {0}")]
    Initialization(String),

    /// Every attempt timed out.
    #[error("Cannot communicate with the engine: {operation} on '{index}' gave up after {attempts} attempts")]
    Communication {
        /// Operation name.
        operation: String,
        /// Target index.
        index: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Malformed or unexpected response shape.
    #[error("Internal client error: {0}")]
    Internal(String),

    /// Unexpected transport failure while performing a request.
    #[error("Internal client error during {operation}: {source}")]
    Transport {
        /// Operation name.
        operation: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The engine answered with a status the operation does not accept.
    #[error("{action} failed: {reason} (status {status})")]
    ActionResponse {
        /// Action being performed.
        action: String,
        /// HTTP reason phrase.
        reason: String,
        /// HTTP status code.
        status: String,
    },

    /// A request entity could not be encoded.
    #[error("Cannot write request entity: {0}")]
    RequestEntityWrite(#[source] serde_json::Error),

    /// A response entity could not be decoded.
    #[error("Cannot read response entity: {0}")]
    ResponseEntityRead(#[source] serde_json::Error),

    /// A record could not be converted to or from a document.
    #[error("Marshalling error: {0}")]
    Marshal(#[from] MarshalError),

    /// The engine capped its exact-count window.
    #[error("Limits exceeded: {0}")]
    LimitsExceeded(String),

    /// The reported total does not fit the result counter.
    #[error("Total hits exceeds integer max value: {total}")]
    HitsOverflow {
        /// Reported total.
        total: u64,
    },
}

impl ClientError {
    /// Build an action-response error from an unaccepted response.
    pub fn action_response(action: impl Into<String>, response: &RawResponse) -> Self {
        Self::ActionResponse {
            action: action.into(),
            reason: response.reason_phrase().unwrap_or(UNKNOWN_REASON).to_string(),
            status: response.status_label(),
        }
    }

    /// Check if a caller may reasonably retry the whole operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Communication { .. })
    }

    /// Check if this error is a data error rather than a transport or protocol one.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Marshal(_) | Self::RequestEntityWrite(_) | Self::ResponseEntityRead(_)
        )
    }
}

/// Errors raised while converting records to or from documents.
#[derive(Error, Debug)]
pub enum MarshalError {
    /// A synthetic key required for decoding is absent.
    #[error("Document is missing required key '{0}'")]
    MissingKey(String),

    /// The type descriptor does not name a known record kind.
    #[error("Unknown type descriptor '{0}'")]
    UnknownType(String),

    /// A record kind was recognized but no decoder is registered for it.
    #[error("No decoder registered for {0}")]
    NoDecoder(String),

    /// A record did not marshal to a JSON object.
    #[error("Record did not marshal to an object")]
    NotAnObject,

    /// Field-level encode or decode failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Query could not be converted.
    #[error("Query conversion failed: {0}")]
    Query(String),
}

/// Result type alias for datastore client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Result type alias for marshalling operations.
pub type MarshalResult<T> = std::result::Result<T, MarshalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_response_from_status() {
        let error = ClientError::action_response("Insert", &RawResponse::new(Some(503), ""));

        match &error {
            ClientError::ActionResponse { action, reason, status } => {
                assert_eq!(action, "Insert");
                assert_eq!(reason, "Service Unavailable");
                assert_eq!(status, "503");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_action_response_without_status() {
        let error = ClientError::action_response("Count", &RawResponse::new(None, ""));
        assert_eq!(
            error.to_string(),
            "Count failed: Unknown. Cannot get the reason from Response (status Unknown)"
        );
    }

    #[test]
    fn test_error_categories() {
        let communication = ClientError::Communication {
            operation: "QUERY".into(),
            index: "metrics-1".into(),
            attempts: 4,
        };
        assert!(communication.is_retryable());
        assert!(!communication.is_data_error());

        let marshal = ClientError::from(MarshalError::MissingKey("id".into()));
        assert!(marshal.is_data_error());
        assert!(!marshal.is_retryable());
    }
}
