//! Error types for transaction ordering.

use shared_types::RpcError;
use thiserror::Error;

/// All errors that can occur in transaction ordering.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderingError {
    /// Empty transaction batch.
    #[error("Empty transaction batch")]
    EmptyBatch,

    /// A profile carried an empty transaction id.
    #[error("Transaction profile missing id")]
    MissingTxId,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias for ordering operations.
pub type OrderingResult<T> = Result<T, OrderingError>;

impl From<OrderingError> for RpcError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::EmptyBatch | OrderingError::MissingTxId => {
                RpcError::invalid_argument(err.to_string())
            }
            OrderingError::Internal(msg) => RpcError::internal(msg),
        }
    }
}
