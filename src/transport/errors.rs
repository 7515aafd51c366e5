//! Transport error types

use thiserror::Error;

pub type TransportResult<T> = Result<T, TransportError>;

/// Failure of one round trip to the execution endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Endpoint answered with a non-success status
    #[error("Server error: {status}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    /// Body was not JSON, or not the shape the request expected
    #[error("Malformed response: {0}")]
    MalformedBody(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::Status { .. } => "DYNQ_TRANSPORT_STATUS",
            TransportError::Network(_) => "DYNQ_TRANSPORT_NETWORK",
            TransportError::MalformedBody(_) => "DYNQ_TRANSPORT_MALFORMED",
            TransportError::InvalidUrl(_) => "DYNQ_TRANSPORT_INVALID_URL",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => TransportError::Status {
                status: status.as_u16(),
                body: String::new(),
            },
            None if err.is_decode() => TransportError::MalformedBody(err.to_string()),
            None => TransportError::Network(err.to_string()),
        }
    }
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}
