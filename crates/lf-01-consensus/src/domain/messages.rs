//! # RPC Messages
//!
//! The two RAFT wire messages plus the local proposal receipt.

use super::entities::LogEntry;
use serde::{Deserialize, Serialize};

/// Vote solicitation from a candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestVoteRequest {
    /// Candidate's term.
    pub term: u64,
    /// Candidate soliciting the vote.
    pub candidate_id: String,
    /// Index of the candidate's last log entry.
    pub last_log_index: u64,
    /// Term of the candidate's last log entry.
    pub last_log_term: u64,
}

/// Reply to a vote solicitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestVoteResponse {
    /// Responder's term, for the candidate to adopt if greater.
    pub term: u64,
    /// Whether the vote was granted.
    pub vote_granted: bool,
}

/// Log replication / heartbeat from a leader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendEntriesRequest {
    /// Leader's term.
    pub term: u64,
    /// Leader's id, so followers can redirect proposals.
    pub leader_id: String,
    /// Index of the entry immediately preceding `entries`.
    pub prev_log_index: u64,
    /// Term of the entry at `prev_log_index`.
    pub prev_log_term: u64,
    /// Entries to append. Empty for heartbeats.
    pub entries: Vec<LogEntry>,
    /// Leader's commit index.
    pub leader_commit: u64,
}

/// Reply to a replication request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendEntriesResponse {
    /// Responder's term, for the leader to adopt if greater.
    pub term: u64,
    /// Whether `prev_log_index`/`prev_log_term` matched and entries were
    /// appended.
    pub success: bool,
    /// Responder's last log index; lets the leader rewind `next_index`
    /// in one step instead of probing entry by entry.
    pub last_log_index: u64,
}

/// Outcome of a committed proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeReceipt {
    /// Index assigned to the proposed entry.
    pub index: u64,
    /// Term the entry was proposed in.
    pub term: u64,
    /// True once a quorum has durably matched the entry.
    pub committed: bool,
}
