//! Error types for the Parserator SDK.

use parserator_domain::{DomainError, ErrorKind, ParseFailure};
use thiserror::Error;

/// Errors returned to callers for local problems: bad configuration or
/// bad arguments. Remote failures are reported as `ParseResult::Failure`.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Client configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Schema, input or options rejected before sending
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Failure of a single HTTP exchange.
///
/// Produced only inside the transport; callers see it converted into a
/// [`ParseFailure`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// Request exceeded its timeout or the caller's deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Could not connect (DNS, refused, TLS)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request failed after connecting, or while reading the body
    #[error("Network error: {0}")]
    Network(String),

    /// A 2xx body that is not the expected JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Result-level view of this error
    pub fn into_failure(self) -> ParseFailure {
        let kind = match &self {
            TransportError::Timeout(_) => ErrorKind::TimeoutError,
            TransportError::Connection(_) => ErrorKind::NetworkError,
            TransportError::Network(_) => ErrorKind::TransportError,
            TransportError::InvalidResponse(_) => ErrorKind::DecodeError,
        };
        ParseFailure::new(kind, self.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connection(e.to_string())
        } else if e.is_decode() {
            TransportError::InvalidResponse(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_kinds() {
        let cases = [
            (TransportError::Timeout("t".into()), ErrorKind::TimeoutError),
            (TransportError::Connection("c".into()), ErrorKind::NetworkError),
            (TransportError::Network("n".into()), ErrorKind::TransportError),
            (TransportError::InvalidResponse("d".into()), ErrorKind::DecodeError),
        ];
        for (error, kind) in cases {
            assert_eq!(error.into_failure().kind, kind);
        }
    }

    #[test]
    fn test_domain_error_is_transparent() {
        let err: SdkError = DomainError::InvalidInput("input text is empty".into()).into();
        assert_eq!(err.to_string(), "Invalid input: input text is empty");
    }
}
