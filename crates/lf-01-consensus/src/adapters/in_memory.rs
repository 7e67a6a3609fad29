//! # In-Memory Adapters
//!
//! Loopback transport and volatile state store for single-process
//! clusters and tests. The cluster routes peer RPCs directly into the
//! target node's handlers; `isolate`/`heal` simulate partitions.

use crate::domain::{
    AppendEntriesRequest, AppendEntriesResponse, HardState, LogEntry, RequestVoteRequest,
    RequestVoteResponse,
};
use crate::ports::inbound::ConsensusApi;
use crate::ports::outbound::{RaftStateStore, RaftTransport, StoreError, TransportError};
use crate::service::RaftNode;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Routes RAFT RPCs between nodes registered in the same process.
pub struct InMemoryCluster {
    nodes: RwLock<HashMap<String, Arc<RaftNode>>>,
    partitioned: RwLock<HashSet<String>>,
}

impl InMemoryCluster {
    /// Create an empty cluster.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            nodes: RwLock::new(HashMap::new()),
            partitioned: RwLock::new(HashSet::new()),
        })
    }

    /// Register a node under its id.
    pub fn register(&self, node: Arc<RaftNode>) {
        self.nodes.write().insert(node.node_id().to_string(), node);
    }

    /// A transport handle for one node. Partitions are symmetric: an
    /// isolated node can neither be reached nor reach out.
    #[must_use]
    pub fn handle(self: &Arc<Self>, source: impl Into<String>) -> Arc<ClusterHandle> {
        Arc::new(ClusterHandle {
            cluster: Arc::clone(self),
            source: source.into(),
        })
    }

    /// Cut a node off from everyone.
    pub fn isolate(&self, node_id: &str) {
        self.partitioned.write().insert(node_id.to_string());
    }

    /// Restore reachability of a node.
    pub fn heal(&self, node_id: &str) {
        self.partitioned.write().remove(node_id);
    }

    fn route(&self, source: &str, target: &str) -> Result<Arc<RaftNode>, TransportError> {
        let partitioned = self.partitioned.read();
        if partitioned.contains(source) || partitioned.contains(target) {
            return Err(TransportError::Unreachable(target.to_string()));
        }
        drop(partitioned);
        self.nodes
            .read()
            .get(target)
            .cloned()
            .ok_or_else(|| TransportError::Unreachable(target.to_string()))
    }
}

/// Per-node view of the in-memory cluster.
pub struct ClusterHandle {
    cluster: Arc<InMemoryCluster>,
    source: String,
}

#[async_trait]
impl RaftTransport for ClusterHandle {
    async fn request_vote(
        &self,
        target: &str,
        req: RequestVoteRequest,
    ) -> Result<RequestVoteResponse, TransportError> {
        let node = self.cluster.route(&self.source, target)?;
        node.request_vote(req)
            .await
            .map_err(|e| TransportError::Unreachable(format!("{target}: {e}")))
    }

    async fn append_entries(
        &self,
        target: &str,
        req: AppendEntriesRequest,
    ) -> Result<AppendEntriesResponse, TransportError> {
        let node = self.cluster.route(&self.source, target)?;
        node.append_entries(req)
            .await
            .map_err(|e| TransportError::Unreachable(format!("{target}: {e}")))
    }
}

/// Volatile state store.
///
/// Keeps the durable-write ordering contract observable in tests:
/// `fail_writes` makes every write return an error.
pub struct InMemoryStateStore {
    state: Mutex<(HardState, Vec<LogEntry>)>,
    fail_writes: AtomicBool,
}

impl InMemoryStateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new((HardState::default(), Vec::new())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Toggle write failures.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The persisted hard state.
    #[must_use]
    pub fn hard_state(&self) -> HardState {
        self.state.lock().0.clone()
    }

    /// Number of persisted log entries.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.state.lock().1.len()
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RaftStateStore for InMemoryStateStore {
    async fn save_hard_state(&self, hard_state: &HardState) -> Result<(), StoreError> {
        self.check_writes()?;
        self.state.lock().0 = hard_state.clone();
        Ok(())
    }

    async fn append_log(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        self.check_writes()?;
        self.state.lock().1.extend_from_slice(entries);
        Ok(())
    }

    async fn truncate_log(&self, from_index: u64) -> Result<(), StoreError> {
        self.check_writes()?;
        self.state.lock().1.retain(|e| e.index < from_index);
        Ok(())
    }

    async fn load(&self) -> Result<(HardState, Vec<LogEntry>), StoreError> {
        let state = self.state.lock();
        Ok((state.0.clone(), state.1.clone()))
    }
}
