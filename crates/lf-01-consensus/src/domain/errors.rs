//! Error types for the consensus engine.

use shared_types::RpcError;
use thiserror::Error;

/// All errors that can occur in the consensus engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// A proposal or membership change hit a non-leader.
    #[error("Not the leader; current leader is {leader_hint:?}")]
    NotLeader {
        /// The leader this node last heard from, if any.
        leader_hint: Option<String>,
    },

    /// A membership change is already in flight; changes apply one at a
    /// time.
    #[error("A membership change is already in flight")]
    MembershipChangeInFlight,

    /// Node is already a cluster member.
    #[error("Node already a member: {0}")]
    AlreadyMember(String),

    /// Node is not a cluster member.
    #[error("Node not a member: {0}")]
    NotMember(String),

    /// Removing the last member would leave an empty cluster.
    #[error("Cannot remove the last cluster member")]
    LastMember,

    /// The durable state store rejected a write.
    #[error("State store unavailable: {0}")]
    Store(String),

    /// A peer could not be reached.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The proposal was not committed before the deadline.
    #[error("Proposal not committed before deadline")]
    CommitTimeout,

    /// The proposed entry was truncated by a newer leader and will never
    /// commit.
    #[error("Proposal superseded by a newer leader")]
    Superseded,
}

/// Result alias for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;

impl From<ConsensusError> for RpcError {
    fn from(err: ConsensusError) -> Self {
        match &err {
            ConsensusError::NotLeader { .. }
            | ConsensusError::MembershipChangeInFlight
            | ConsensusError::Superseded => RpcError::failed_precondition(err.to_string()),
            ConsensusError::AlreadyMember(_) => RpcError::already_exists(err.to_string()),
            ConsensusError::NotMember(_) => RpcError::not_found(err.to_string()),
            ConsensusError::LastMember => RpcError::failed_precondition(err.to_string()),
            ConsensusError::Store(_) | ConsensusError::Transport(_) => {
                RpcError::unavailable(err.to_string())
            }
            ConsensusError::CommitTimeout => RpcError::deadline_exceeded(err.to_string()),
        }
    }
}
