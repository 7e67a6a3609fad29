//! # LF-01 Consensus - RAFT Leader Election & Log Replication
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Keeps a replicated, totally-ordered log of opaque commands across the
//! fabric's nodes: randomized leader election, heartbeat-driven
//! replication, quorum commit, and single-server membership changes
//! serialized through the log itself.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Term Monotonicity | `service/mod.rs` - `step_down()` adopts upward only |
//! | INVARIANT-2 | Election Safety (one leader per term) | one durable vote per term + quorum |
//! | INVARIANT-3 | Leader Append-Only | leaders push at the tail in `propose_entry()` |
//! | INVARIANT-4 | Log Matching | `append_entries()` prev check + conflict truncation |
//! | INVARIANT-5 | State-Machine Safety | `apply_committed()` single in-order pass |
//!
//! ## Durability
//!
//! `current_term`, `voted_for`, and the log are written through the
//! [`RaftStateStore`] port before the responses that promise them leave
//! the node. A vote granted but not persisted could be granted twice
//! after a restart, electing two leaders in one term.
//!
//! ## Concurrency Model
//!
//! Per-node state sits behind one async mutex. RPC handlers never hold
//! it across a transport call: requests are built under the lock, sent
//! outside it, and responses re-acquire it (discarding stale results by
//! term). Timers run in a single background driver task.
//!
//! ## Failure Semantics
//!
//! A partitioned minority cannot elect a leader and answers proposals
//! with a not-leader error carrying the last known leader as a hint.
//! Rejoining nodes are caught up by replication rewinding `next_index`
//! until logs match.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use lf_01_consensus::{ConsensusApi, InMemoryCluster, InMemoryStateStore, RaftConfig, RaftNode};
//!
//! let cluster = InMemoryCluster::new();
//! let node = RaftNode::new(
//!     RaftConfig::single("n1"),
//!     cluster.handle("n1"),
//!     std::sync::Arc::new(InMemoryStateStore::new()),
//!     bus,
//! ).await?;
//! node.spawn_timers();
//!
//! let receipt = node.propose_value(b"payload".to_vec()).await?;
//! assert!(receipt.committed);
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{ClusterHandle, InMemoryCluster, InMemoryStateStore};
pub use config::RaftConfig;
pub use domain::{
    AppendEntriesRequest, AppendEntriesResponse, ConsensusError, ConsensusResult, EntryPayload,
    HardState, LogEntry, ProposeReceipt, RaftStatus, RequestVoteRequest, RequestVoteResponse,
};
pub use ports::{ConsensusApi, RaftStateStore, RaftTransport, StoreError, TransportError};
pub use service::RaftNode;
