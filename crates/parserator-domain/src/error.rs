//! Construction errors for domain values.

use crate::result::ErrorKind;
use thiserror::Error;

/// Errors raised while constructing schemas, options or requests.
///
/// These are caller mistakes caught before anything reaches the network.
/// Remote failures are never represented here; they travel as
/// [`crate::ParseResult::Failure`] values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Schema shape or field types are not acceptable
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Input text is blank or too long
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parse options are out of range
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl DomainError {
    /// The result error kind this construction error corresponds to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidSchema(_) => ErrorKind::InvalidSchema,
            DomainError::InvalidInput(_) | DomainError::InvalidOptions(_) => ErrorKind::InvalidInput,
        }
    }
}
