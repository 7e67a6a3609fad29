//! # Domain Entities
//!
//! Core entities for the RAFT consensus engine: the replicated log, the
//! durable hard state, and point-in-time node status.

use serde::{Deserialize, Serialize};
use shared_types::NodeRole;

/// What a log entry carries.
///
/// Commands are opaque bytes from the caller; membership changes travel
/// through the same log so they serialize with normal traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPayload {
    /// An opaque client command.
    Command(Vec<u8>),
    /// Single-server addition.
    AddNode(String),
    /// Single-server removal.
    RemoveNode(String),
}

/// One entry of the replicated log.
///
/// Indices are 1-based and strictly increasing; if two replicas agree on
/// `(index, term)` they agree on every preceding entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Term in which the entry was created.
    pub term: u64,
    /// 1-based position in the log.
    pub index: u64,
    /// The payload.
    pub payload: EntryPayload,
}

/// State that must survive restarts: losing it can double-vote a term or
/// roll the term counter backwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardState {
    /// Monotonic term counter.
    pub current_term: u64,
    /// Vote cast in `current_term`, if any. At most one per term.
    pub voted_for: Option<String>,
}

/// Point-in-time view of a node, for the status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaftStatus {
    /// This node's id.
    pub node_id: String,
    /// Current role.
    pub role: NodeRole,
    /// Current term.
    pub current_term: u64,
    /// Vote cast in the current term.
    pub voted_for: Option<String>,
    /// Highest log index known committed.
    pub commit_index: u64,
    /// Highest log index applied locally. Never exceeds `commit_index`.
    pub last_applied: u64,
    /// Index of the last log entry (0 when empty).
    pub last_log_index: u64,
    /// Term of the last log entry (0 when empty).
    pub last_log_term: u64,
    /// Current leader, when known.
    pub leader_id: Option<String>,
    /// Cluster membership, including this node.
    pub members: Vec<String>,
}
