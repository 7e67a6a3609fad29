//! Error types for the streaming services.

use shared_types::{InvalidTransition, RpcError};
use thiserror::Error;

/// All errors that can occur in the streaming services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Malformed submission field.
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// No transaction with this id.
    #[error("Transaction not found: {0}")]
    UnknownTransaction(String),

    /// No validator with this id.
    #[error("Validator not found: {0}")]
    UnknownValidator(String),

    /// The requested status change is not in the lifecycle table.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// Result alias for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

impl From<StreamError> for RpcError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::InvalidSubmission(_) => RpcError::invalid_argument(err.to_string()),
            StreamError::UnknownTransaction(_) | StreamError::UnknownValidator(_) => {
                RpcError::not_found(err.to_string())
            }
            StreamError::InvalidTransition(inner) => inner.into(),
        }
    }
}
