//! # Error Taxonomy
//!
//! The uniform error surface exposed at every RPC boundary. Subsystem
//! crates define their own `thiserror` enums and convert into [`RpcError`]
//! at the boundary, preserving the kind.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The kind of an RPC-boundary error.
///
/// Callers may retry `Unavailable`; everything else is a caller or state
/// problem that retrying will not fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed request fields (empty payload, missing signer, ...).
    InvalidArgument,
    /// Target entity does not exist.
    NotFound,
    /// Wrong state for the operation (e.g. proposal on a non-leader).
    FailedPrecondition,
    /// Duplicate identity (e.g. an existing bridge id).
    AlreadyExists,
    /// RPC or internal timeout.
    DeadlineExceeded,
    /// Transient; the caller may retry.
    Unavailable,
    /// Unexpected; logged with a correlation id.
    Internal,
}

/// An error surfaced at an RPC boundary.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct RpcError {
    /// Taxonomy kind.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Correlation id for `Internal` errors, for log matching.
    pub correlation_id: Option<Uuid>,
}

impl RpcError {
    /// Build an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            correlation_id: None,
        }
    }

    /// Malformed request fields.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Target entity does not exist.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Wrong state for the operation.
    #[must_use]
    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FailedPrecondition, message)
    }

    /// Duplicate identity.
    #[must_use]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// RPC or internal timeout.
    #[must_use]
    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeadlineExceeded, message)
    }

    /// Transient failure; caller may retry.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    /// Unexpected failure. Assigns a correlation id and logs it.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        let correlation_id = Uuid::new_v4();
        let message = message.into();
        tracing::error!(%correlation_id, error = %message, "Internal error");
        Self {
            kind: ErrorKind::Internal,
            message,
            correlation_id: Some(correlation_id),
        }
    }

    /// The taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}
