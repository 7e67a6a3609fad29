//! Consensus engine configuration.

use shared_types::FabricConfig;

/// Configuration for one RAFT node.
#[derive(Debug, Clone)]
pub struct RaftConfig {
    /// Stable id of this node.
    pub node_id: String,
    /// Initial cluster membership, including this node.
    pub members: Vec<String>,
    /// Randomized election timeout range in milliseconds `(low, high)`.
    pub election_timeout_ms_range: (u64, u64),
    /// Leader heartbeat interval in milliseconds. Must stay strictly
    /// below the election timeout lower bound.
    pub heartbeat_interval_ms: u64,
    /// How long a proposal waits for quorum commit before
    /// `CommitTimeout`.
    pub propose_commit_timeout_ms: u64,
}

impl RaftConfig {
    /// Single-node configuration with default timers.
    #[must_use]
    pub fn single(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        Self {
            members: vec![node_id.clone()],
            node_id,
            election_timeout_ms_range: (150, 300),
            heartbeat_interval_ms: 50,
            propose_commit_timeout_ms: 5_000,
        }
    }

    /// Derive a node config from the fabric-wide record.
    #[must_use]
    pub fn from_fabric(node_id: impl Into<String>, members: Vec<String>, fabric: &FabricConfig) -> Self {
        Self {
            node_id: node_id.into(),
            members,
            election_timeout_ms_range: fabric.election_timeout_ms_range,
            heartbeat_interval_ms: fabric.heartbeat_interval_ms,
            propose_commit_timeout_ms: 5_000,
        }
    }
}
