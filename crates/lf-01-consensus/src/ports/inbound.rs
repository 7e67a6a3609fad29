//! Inbound Ports (Driving Ports / API)

use crate::domain::{
    AppendEntriesRequest, AppendEntriesResponse, ConsensusResult, ProposeReceipt, RaftStatus,
    RequestVoteRequest, RequestVoteResponse,
};
use async_trait::async_trait;

/// Primary consensus API.
///
/// `request_vote` and `append_entries` are the peer-facing RPCs; the rest
/// is the client surface.
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Handle a vote solicitation from a candidate.
    async fn request_vote(&self, req: RequestVoteRequest) -> ConsensusResult<RequestVoteResponse>;

    /// Handle replication or heartbeat from a leader.
    async fn append_entries(
        &self,
        req: AppendEntriesRequest,
    ) -> ConsensusResult<AppendEntriesResponse>;

    /// Propose an opaque command. Leader only; resolves once a quorum has
    /// matched the entry.
    async fn propose_value(&self, payload: Vec<u8>) -> ConsensusResult<ProposeReceipt>;

    /// Add a node to the cluster. Leader only; one change at a time.
    async fn add_node(&self, node_id: String) -> ConsensusResult<ProposeReceipt>;

    /// Remove a node from the cluster. Leader only; one change at a time.
    async fn remove_node(&self, node_id: String) -> ConsensusResult<ProposeReceipt>;

    /// Point-in-time node status.
    async fn status(&self) -> RaftStatus;
}
