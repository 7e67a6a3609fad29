//! Outbound Ports (Driven Ports / SPI)

use crate::domain::{
    AppendEntriesRequest, AppendEntriesResponse, HardState, LogEntry, RequestVoteRequest,
    RequestVoteResponse,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from peer transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The peer is unknown or unreachable.
    #[error("Peer unreachable: {0}")]
    Unreachable(String),
}

/// Errors from the durable state store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write was rejected or lost.
    #[error("Write failed: {0}")]
    WriteFailed(String),
}

/// Peer-to-peer message transport.
#[async_trait]
pub trait RaftTransport: Send + Sync {
    /// Send a vote solicitation to one peer.
    async fn request_vote(
        &self,
        target: &str,
        req: RequestVoteRequest,
    ) -> Result<RequestVoteResponse, TransportError>;

    /// Send replication or heartbeat to one peer.
    async fn append_entries(
        &self,
        target: &str,
        req: AppendEntriesRequest,
    ) -> Result<AppendEntriesResponse, TransportError>;
}

/// Durable storage for term, vote, and log.
///
/// Writes must complete before the responses that promise them are sent:
/// a vote that is granted but not persisted can be granted twice after a
/// restart.
#[async_trait]
pub trait RaftStateStore: Send + Sync {
    /// Persist term and vote.
    async fn save_hard_state(&self, hard_state: &HardState) -> Result<(), StoreError>;

    /// Append entries at the end of the durable log.
    async fn append_log(&self, entries: &[LogEntry]) -> Result<(), StoreError>;

    /// Drop all durable entries with `index >= from_index`.
    async fn truncate_log(&self, from_index: u64) -> Result<(), StoreError>;

    /// Load persisted state at startup.
    async fn load(&self) -> Result<(HardState, Vec<LogEntry>), StoreError>;
}

/// Mock implementations for testing
#[cfg(test)]
pub mod mocks {
    use super::*;

    /// Transport whose peers never answer.
    pub struct UnreachableTransport;

    #[async_trait]
    impl RaftTransport for UnreachableTransport {
        async fn request_vote(
            &self,
            target: &str,
            _req: RequestVoteRequest,
        ) -> Result<RequestVoteResponse, TransportError> {
            Err(TransportError::Unreachable(target.to_string()))
        }

        async fn append_entries(
            &self,
            target: &str,
            _req: AppendEntriesRequest,
        ) -> Result<AppendEntriesResponse, TransportError> {
            Err(TransportError::Unreachable(target.to_string()))
        }
    }
}
