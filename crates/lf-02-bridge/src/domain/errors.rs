//! Error types for bridge coordination.

use shared_types::{InvalidTransition, RepositoryError, RpcError};
use thiserror::Error;

/// All errors that can occur in the bridge coordinator.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A transfer with this id already exists.
    #[error("Bridge transfer already exists: {0}")]
    DuplicateBridge(String),

    /// No transfer with this id.
    #[error("Bridge transfer not found: {0}")]
    UnknownBridge(String),

    /// Malformed request field.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The lock proof did not verify.
    #[error("Lock proof rejected for {0}")]
    ProofRejected(String),

    /// The requested status change is not in the transition table.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The backing store refused the write.
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Result alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl From<BridgeError> for RpcError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::DuplicateBridge(_) => RpcError::already_exists(err.to_string()),
            BridgeError::UnknownBridge(_) => RpcError::not_found(err.to_string()),
            BridgeError::InvalidRequest(_) | BridgeError::ProofRejected(_) => {
                RpcError::invalid_argument(err.to_string())
            }
            BridgeError::InvalidTransition(inner) => inner.into(),
            BridgeError::Persistence(inner) => inner.into(),
        }
    }
}
