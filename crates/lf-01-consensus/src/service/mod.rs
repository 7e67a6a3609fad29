//! RAFT Node - Core consensus logic
//!
//! # Architecture
//!
//! - All per-node state lives behind one async mutex; transitions are
//!   serialized, and the lock is never held across a transport call.
//! - Timers run in one background driver: leaders send heartbeats every
//!   `heartbeat_interval_ms`, everyone else checks a randomized election
//!   deadline.
//! - Durable writes (`current_term`, `voted_for`, log) go through the
//!   state store before the responses that promise them are sent.
//!
//! # Safety Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Election Safety | one vote per term, quorum required |
//! | Leader Append-Only | leaders only push at the log tail |
//! | Log Matching | `prev_log` check + conflict truncation |
//! | State-Machine Safety | `last_applied` advances once, in order |
//! | Term Monotonicity | terms only adopt upward |
//!
//! A leader advances `commit_index` only over entries of its own term;
//! earlier-term entries commit implicitly behind them.

use crate::config::RaftConfig;
use crate::domain::{
    AppendEntriesRequest, AppendEntriesResponse, ConsensusError, ConsensusResult, EntryPayload,
    HardState, LogEntry, ProposeReceipt, RaftStatus, RequestVoteRequest, RequestVoteResponse,
};
use crate::ports::inbound::ConsensusApi;
use crate::ports::outbound::{RaftStateStore, RaftTransport};
use async_trait::async_trait;
use fabric_telemetry::metrics::{
    RAFT_CURRENT_TERM, RAFT_ELECTIONS, RAFT_ENTRIES_COMMITTED, RAFT_HEARTBEATS_SENT,
    RAFT_ROLE_TRANSITIONS,
};
use rand::Rng;
use shared_bus::{Event, EventPayload as BusPayload, ObserverBus};
use shared_types::{NodeRole, StateMachine};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};


/// A proposal waiting for quorum commit.
type CommitWaiter = (u64, oneshot::Sender<ConsensusResult<()>>);

/// Mutable per-node state. Guarded by the node's single mutex.
struct RaftCore {
    role: NodeRole,
    current_term: u64,
    voted_for: Option<String>,
    log: Vec<LogEntry>,
    commit_index: u64,
    last_applied: u64,
    members: Vec<String>,
    next_index: HashMap<String, u64>,
    match_index: HashMap<String, u64>,
    leader_id: Option<String>,
    election_deadline: Instant,
    pending: HashMap<u64, CommitWaiter>,
    config_change_inflight: Option<u64>,
}

impl RaftCore {
    fn last_log_index(&self) -> u64 {
        self.log.last().map(|e| e.index).unwrap_or(0)
    }

    fn last_log_term(&self) -> u64 {
        self.log.last().map(|e| e.term).unwrap_or(0)
    }

    /// Term of the entry at `index`; 0 for the empty prefix.
    fn entry_term(&self, index: u64) -> Option<u64> {
        if index == 0 {
            return Some(0);
        }
        self.log.get(index as usize - 1).map(|e| e.term)
    }

    fn quorum(&self) -> usize {
        self.members.len() / 2 + 1
    }

    fn hard_state(&self) -> HardState {
        HardState {
            current_term: self.current_term,
            voted_for: self.voted_for.clone(),
        }
    }
}

/// The legal role transitions of one node.
fn role_machine() -> StateMachine<NodeRole> {
    StateMachine::builder()
        .allow(NodeRole::Follower, [NodeRole::Candidate])
        .allow(NodeRole::Candidate, [NodeRole::Leader, NodeRole::Follower])
        .allow(NodeRole::Leader, [NodeRole::Follower, NodeRole::Candidate])
        .build()
}

/// One RAFT consensus node.
pub struct RaftNode {
    config: RaftConfig,
    transport: Arc<dyn RaftTransport>,
    store: Arc<dyn RaftStateStore>,
    bus: Arc<ObserverBus>,
    roles: StateMachine<NodeRole>,
    core: Mutex<RaftCore>,
    stopped: AtomicBool,
}

impl RaftNode {
    /// Create a node, recovering persisted term/vote/log from the store.
    pub async fn new(
        config: RaftConfig,
        transport: Arc<dyn RaftTransport>,
        store: Arc<dyn RaftStateStore>,
        bus: Arc<ObserverBus>,
    ) -> ConsensusResult<Arc<Self>> {
        let (hard_state, log) = store
            .load()
            .await
            .map_err(|e| ConsensusError::Store(e.to_string()))?;

        let deadline = Instant::now() + random_timeout(config.election_timeout_ms_range);
        let core = RaftCore {
            role: NodeRole::Follower,
            current_term: hard_state.current_term,
            voted_for: hard_state.voted_for,
            log,
            commit_index: 0,
            last_applied: 0,
            members: config.members.clone(),
            next_index: HashMap::new(),
            match_index: HashMap::new(),
            leader_id: None,
            election_deadline: deadline,
            pending: HashMap::new(),
            config_change_inflight: None,
        };

        RAFT_CURRENT_TERM
            .with_label_values(&[&config.node_id])
            .set(core.current_term as f64);

        info!(
            node_id = %config.node_id,
            term = core.current_term,
            log_len = core.log.len(),
            members = core.members.len(),
            "Consensus node starting as follower"
        );

        Ok(Arc::new(Self {
            config,
            transport,
            store,
            bus,
            roles: role_machine(),
            core: Mutex::new(core),
            stopped: AtomicBool::new(false),
        }))
    }

    /// This node's stable id.
    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.config.node_id
    }

    /// Spawn the timer driver: heartbeats while leader, election checks
    /// otherwise. Returns the driver handle.
    pub fn spawn_timers(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let node = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick =
                tokio::time::interval(Duration::from_millis(node.config.heartbeat_interval_ms));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                if node.stopped.load(Ordering::Acquire) {
                    break;
                }
                let role = node.core.lock().await.role;
                match role {
                    NodeRole::Leader => node.heartbeat_tick().await,
                    _ => node.election_tick().await,
                }
            }
        })
    }

    /// Stop the timer driver at its next tick.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    // === TIMER STEPS ===
    //
    // Both steps are public single-step drivers: the background task
    // calls them on a cadence, and tests can call them directly instead
    // of sleeping through wall-clock timeouts.

    /// Start an election if the randomized deadline has passed.
    pub async fn election_tick(&self) {
        let due = {
            let core = self.core.lock().await;
            core.role != NodeRole::Leader && Instant::now() >= core.election_deadline
        };
        if due {
            self.run_election().await;
        }
    }

    /// Force an election now, regardless of the deadline. Used for manual
    /// failover and deterministic tests.
    pub async fn trigger_election(&self) {
        self.run_election().await;
    }

    /// One replication round to every peer. No-op unless leader.
    pub async fn heartbeat_tick(&self) {
        // (peer, request, index of the last entry carried)
        let batches: Vec<(String, AppendEntriesRequest, u64)> = {
            let core = self.core.lock().await;
            if core.role != NodeRole::Leader {
                return;
            }
            let last = core.last_log_index();
            core.members
                .iter()
                .filter(|m| **m != self.config.node_id)
                .map(|peer| {
                    let next = *core.next_index.get(peer).unwrap_or(&(last + 1));
                    let prev_log_index = next.saturating_sub(1);
                    let prev_log_term = core.entry_term(prev_log_index).unwrap_or(0);
                    let entries: Vec<LogEntry> = core
                        .log
                        .iter()
                        .filter(|e| e.index >= next)
                        .cloned()
                        .collect();
                    let sent_last = entries.last().map(|e| e.index).unwrap_or(prev_log_index);
                    let req = AppendEntriesRequest {
                        term: core.current_term,
                        leader_id: self.config.node_id.clone(),
                        prev_log_index,
                        prev_log_term,
                        entries,
                        leader_commit: core.commit_index,
                    };
                    (peer.clone(), req, sent_last)
                })
                .collect()
        };

        if batches.is_empty() {
            // Single-node cluster: commit advances on propose.
            return;
        }

        let sent_term = batches[0].1.term;
        let mut set = JoinSet::new();
        for (peer, req, sent_last) in batches {
            if req.entries.is_empty() {
                RAFT_HEARTBEATS_SENT.inc();
            }
            let transport = Arc::clone(&self.transport);
            set.spawn(async move {
                let resp = transport.append_entries(&peer, req).await;
                (peer, sent_last, resp)
            });
        }

        let mut responses = Vec::new();
        while let Some(joined) = set.join_next().await {
            if let Ok(result) = joined {
                responses.push(result);
            }
        }

        let mut core = self.core.lock().await;
        if core.role != NodeRole::Leader || core.current_term != sent_term {
            return;
        }
        for (peer, sent_last, resp) in responses {
            let resp = match resp {
                Ok(resp) => resp,
                Err(e) => {
                    debug!(node_id = %self.config.node_id, peer = %peer, error = %e, "Replication failed");
                    continue;
                }
            };
            if resp.term > core.current_term {
                self.step_down(&mut core, resp.term, None);
                let hs = core.hard_state();
                drop(core);
                self.persist_hard_state(&hs).await;
                return;
            }
            if resp.success {
                core.match_index.insert(peer.clone(), sent_last);
                core.next_index.insert(peer, sent_last + 1);
            } else {
                // Rewind toward the follower's tail and retry next tick.
                let next = core.next_index.entry(peer).or_insert(sent_last + 1);
                *next = (resp.last_log_index + 1).min((*next).saturating_sub(1)).max(1);
            }
        }
        self.advance_commit(&mut core);
    }

    // === ELECTION ===

    async fn run_election(&self) {
        let (req, peers, term) = {
            let mut core = self.core.lock().await;
            self.set_role(&mut core, NodeRole::Candidate);
            core.current_term += 1;
            core.voted_for = Some(self.config.node_id.clone());
            core.leader_id = None;
            self.reset_election_deadline(&mut core);
            RAFT_CURRENT_TERM
                .with_label_values(&[&self.config.node_id])
                .set(core.current_term as f64);

            info!(
                node_id = %self.config.node_id,
                term = core.current_term,
                "Election started"
            );

            let req = RequestVoteRequest {
                term: core.current_term,
                candidate_id: self.config.node_id.clone(),
                last_log_index: core.last_log_index(),
                last_log_term: core.last_log_term(),
            };
            let peers: Vec<String> = core
                .members
                .iter()
                .filter(|m| **m != self.config.node_id)
                .cloned()
                .collect();
            (req, peers, core.current_term)
        };

        // Persist the incremented term and self-vote before soliciting.
        {
            let hs = {
                let core = self.core.lock().await;
                core.hard_state()
            };
            self.persist_hard_state(&hs).await;
        }

        let mut granted = 1usize; // own vote
        let mut highest_term = term;

        if !peers.is_empty() {
            let mut set = JoinSet::new();
            for peer in peers {
                let transport = Arc::clone(&self.transport);
                let req = req.clone();
                set.spawn(async move { transport.request_vote(&peer, req).await });
            }
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(Ok(resp)) => {
                        if resp.vote_granted {
                            granted += 1;
                        }
                        highest_term = highest_term.max(resp.term);
                    }
                    Ok(Err(e)) => debug!(node_id = %self.config.node_id, error = %e, "Vote request failed"),
                    Err(_) => {}
                }
            }
        }

        let mut core = self.core.lock().await;
        if core.current_term != term || core.role != NodeRole::Candidate {
            // A newer term or leader arrived while we were counting.
            return;
        }
        if highest_term > core.current_term {
            RAFT_ELECTIONS.with_label_values(&["stepped_down"]).inc();
            self.step_down(&mut core, highest_term, None);
            let hs = core.hard_state();
            drop(core);
            self.persist_hard_state(&hs).await;
            return;
        }
        if granted >= core.quorum() {
            self.become_leader(&mut core, granted);
            drop(core);
            // Assert leadership immediately rather than waiting one tick.
            self.heartbeat_tick().await;
        } else {
            RAFT_ELECTIONS.with_label_values(&["lost"]).inc();
            debug!(
                node_id = %self.config.node_id,
                term,
                granted,
                "Election lost; retrying after next timeout"
            );
        }
    }

    fn become_leader(&self, core: &mut RaftCore, granted: usize) {
        self.set_role(core, NodeRole::Leader);
        core.leader_id = Some(self.config.node_id.clone());
        let next = core.last_log_index() + 1;
        core.next_index.clear();
        core.match_index.clear();
        for member in core.members.clone() {
            if member != self.config.node_id {
                core.next_index.insert(member.clone(), next);
                core.match_index.insert(member, 0);
            }
        }
        RAFT_ELECTIONS.with_label_values(&["won"]).inc();
        info!(
            node_id = %self.config.node_id,
            term = core.current_term,
            granted,
            "Election won"
        );

        // Single-node cluster: everything in the log commits at once.
        self.advance_commit(core);
    }

    // === SHARED TRANSITIONS ===

    fn set_role(&self, core: &mut RaftCore, role: NodeRole) {
        if core.role == role {
            return;
        }
        if let Err(e) = self.roles.transition(core.role, role) {
            warn!(node_id = %self.config.node_id, error = %e, "Refused role transition");
            return;
        }
        core.role = role;
        let label = match role {
            NodeRole::Follower => "follower",
            NodeRole::Candidate => "candidate",
            NodeRole::Leader => "leader",
        };
        RAFT_ROLE_TRANSITIONS.with_label_values(&[label]).inc();
        self.bus.publish(&Event::new(BusPayload::ConsensusRoleChanged {
            node_id: self.config.node_id.clone(),
            role,
            term: core.current_term,
        }));
    }

    /// Adopt a higher term and fall back to follower.
    fn step_down(&self, core: &mut RaftCore, term: u64, leader: Option<String>) {
        if term > core.current_term {
            core.current_term = term;
            core.voted_for = None;
            RAFT_CURRENT_TERM
                .with_label_values(&[&self.config.node_id])
                .set(term as f64);
        }
        if leader.is_some() {
            core.leader_id = leader;
        }
        self.set_role(core, NodeRole::Follower);
        self.reset_election_deadline(core);
    }

    fn reset_election_deadline(&self, core: &mut RaftCore) {
        core.election_deadline = Instant::now() + random_timeout(self.config.election_timeout_ms_range);
    }

    async fn persist_hard_state(&self, hard_state: &HardState) {
        if let Err(e) = self.store.save_hard_state(hard_state).await {
            warn!(node_id = %self.config.node_id, error = %e, "Hard state persist failed");
        }
    }

    /// Advance `commit_index` over quorum-matched entries of the current
    /// term, then apply everything newly committed.
    fn advance_commit(&self, core: &mut RaftCore) {
        if core.role == NodeRole::Leader {
            // Highest index of the current term matched by a quorum.
            // Earlier-term entries commit implicitly behind it.
            let mut n = core.last_log_index();
            while n > core.commit_index {
                let replicated = 1 + core.match_index.values().filter(|m| **m >= n).count();
                if core.entry_term(n) == Some(core.current_term) && replicated >= core.quorum() {
                    core.commit_index = n;
                    break;
                }
                n -= 1;
            }
        }
        self.apply_committed(core);
    }

    /// Apply every committed-but-unapplied entry, in order, exactly once.
    fn apply_committed(&self, core: &mut RaftCore) {
        while core.last_applied < core.commit_index {
            let index = core.last_applied + 1;
            let Some(entry) = core.log.get(index as usize - 1).cloned() else {
                break;
            };
            core.last_applied = index;

            match &entry.payload {
                EntryPayload::Command(_) => {
                    RAFT_ENTRIES_COMMITTED.inc();
                    self.bus.publish(&Event::new(BusPayload::ConsensusCommitted {
                        node_id: self.config.node_id.clone(),
                        index: entry.index,
                        term: entry.term,
                    }));
                }
                EntryPayload::AddNode(node_id) => {
                    if !core.members.contains(node_id) {
                        core.members.push(node_id.clone());
                        if core.role == NodeRole::Leader && *node_id != self.config.node_id {
                            core.next_index.insert(node_id.clone(), core.last_log_index() + 1);
                            core.match_index.insert(node_id.clone(), 0);
                        }
                        info!(node_id = %self.config.node_id, added = %node_id, "Cluster member added");
                    }
                }
                EntryPayload::RemoveNode(node_id) => {
                    core.members.retain(|m| m != node_id);
                    core.next_index.remove(node_id);
                    core.match_index.remove(node_id);
                    info!(node_id = %self.config.node_id, removed = %node_id, "Cluster member removed");
                }
            }

            if core.config_change_inflight == Some(index) {
                core.config_change_inflight = None;
            }
            if let Some((waiter_term, tx)) = core.pending.remove(&index) {
                let outcome = if waiter_term == entry.term {
                    Ok(())
                } else {
                    Err(ConsensusError::Superseded)
                };
                let _ = tx.send(outcome);
            }
        }
    }

    /// Append an entry as leader and wait for quorum commit.
    async fn propose_entry(&self, payload: EntryPayload) -> ConsensusResult<ProposeReceipt> {
        let (index, term, rx) = {
            let mut core = self.core.lock().await;
            if core.role != NodeRole::Leader {
                return Err(ConsensusError::NotLeader {
                    leader_hint: core.leader_id.clone(),
                });
            }

            match &payload {
                EntryPayload::AddNode(node_id) => {
                    if core.config_change_inflight.is_some() {
                        return Err(ConsensusError::MembershipChangeInFlight);
                    }
                    if core.members.contains(node_id) {
                        return Err(ConsensusError::AlreadyMember(node_id.clone()));
                    }
                }
                EntryPayload::RemoveNode(node_id) => {
                    if core.config_change_inflight.is_some() {
                        return Err(ConsensusError::MembershipChangeInFlight);
                    }
                    if !core.members.contains(node_id) {
                        return Err(ConsensusError::NotMember(node_id.clone()));
                    }
                    if core.members.len() == 1 {
                        return Err(ConsensusError::LastMember);
                    }
                }
                EntryPayload::Command(_) => {}
            }

            let index = core.last_log_index() + 1;
            let term = core.current_term;
            let entry = LogEntry {
                term,
                index,
                payload: payload.clone(),
            };

            // Durable before visible: the entry joins the in-memory log
            // only after the store accepted it.
            self.store
                .append_log(std::slice::from_ref(&entry))
                .await
                .map_err(|e| ConsensusError::Store(e.to_string()))?;
            core.log.push(entry);

            if matches!(payload, EntryPayload::AddNode(_) | EntryPayload::RemoveNode(_)) {
                core.config_change_inflight = Some(index);
            }

            let (tx, rx) = oneshot::channel();
            core.pending.insert(index, (term, tx));
            self.advance_commit(&mut core);
            (index, term, rx)
        };

        // Push to peers now instead of waiting for the next tick.
        self.heartbeat_tick().await;

        let timeout = Duration::from_millis(self.config.propose_commit_timeout_ms);
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Ok(()))) => Ok(ProposeReceipt {
                index,
                term,
                committed: true,
            }),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(ConsensusError::Superseded),
            Err(_) => {
                self.core.lock().await.pending.remove(&index);
                Err(ConsensusError::CommitTimeout)
            }
        }
    }
}

#[async_trait]
impl ConsensusApi for RaftNode {
    async fn request_vote(&self, req: RequestVoteRequest) -> ConsensusResult<RequestVoteResponse> {
        let (resp, hard_state) = {
            let mut core = self.core.lock().await;

            if req.term > core.current_term {
                self.step_down(&mut core, req.term, None);
            }

            let log_ok = (req.last_log_term, req.last_log_index)
                >= (core.last_log_term(), core.last_log_index());
            let vote_free = core
                .voted_for
                .as_deref()
                .map_or(true, |v| v == req.candidate_id);
            let grant = req.term == core.current_term && log_ok && vote_free;

            if grant {
                core.voted_for = Some(req.candidate_id.clone());
                self.reset_election_deadline(&mut core);
                debug!(
                    node_id = %self.config.node_id,
                    candidate = %req.candidate_id,
                    term = req.term,
                    "Vote granted"
                );
            }

            (
                RequestVoteResponse {
                    term: core.current_term,
                    vote_granted: grant,
                },
                core.hard_state(),
            )
        };

        // The grant is a durable promise.
        self.store
            .save_hard_state(&hard_state)
            .await
            .map_err(|e| ConsensusError::Store(e.to_string()))?;
        Ok(resp)
    }

    async fn append_entries(
        &self,
        req: AppendEntriesRequest,
    ) -> ConsensusResult<AppendEntriesResponse> {
        let mut core = self.core.lock().await;

        if req.term < core.current_term {
            return Ok(AppendEntriesResponse {
                term: core.current_term,
                success: false,
                last_log_index: core.last_log_index(),
            });
        }

        let term_changed = req.term > core.current_term;
        self.step_down(&mut core, req.term, Some(req.leader_id.clone()));

        // Log Matching check: the entry before the batch must agree.
        if req.prev_log_index > 0 {
            match core.entry_term(req.prev_log_index) {
                Some(term) if term == req.prev_log_term => {}
                _ => {
                    debug!(
                        node_id = %self.config.node_id,
                        prev_log_index = req.prev_log_index,
                        "Append rejected: previous entry mismatch"
                    );
                    return Ok(AppendEntriesResponse {
                        term: core.current_term,
                        success: false,
                        last_log_index: core.last_log_index(),
                    });
                }
            }
        }

        // Truncate at the first conflict, then append what is new.
        let mut truncate_from: Option<u64> = None;
        let mut fresh: Vec<LogEntry> = Vec::new();
        for entry in &req.entries {
            match core.entry_term(entry.index) {
                Some(existing) if existing == entry.term => {}
                Some(_) => {
                    truncate_from = Some(entry.index);
                    fresh = req
                        .entries
                        .iter()
                        .filter(|e| e.index >= entry.index)
                        .cloned()
                        .collect();
                    break;
                }
                None => {
                    fresh = req
                        .entries
                        .iter()
                        .filter(|e| e.index > core.last_log_index())
                        .cloned()
                        .collect();
                    break;
                }
            }
        }

        if let Some(from) = truncate_from {
            self.store
                .truncate_log(from)
                .await
                .map_err(|e| ConsensusError::Store(e.to_string()))?;
            core.log.retain(|e| e.index < from);
            // Entries cut from under a waiter will never commit here.
            let superseded: Vec<u64> = core.pending.keys().filter(|i| **i >= from).copied().collect();
            for index in superseded {
                if let Some((_, tx)) = core.pending.remove(&index) {
                    let _ = tx.send(Err(ConsensusError::Superseded));
                }
            }
        }
        if !fresh.is_empty() {
            self.store
                .append_log(&fresh)
                .await
                .map_err(|e| ConsensusError::Store(e.to_string()))?;
            core.log.extend(fresh);
        }

        let last_new = core.last_log_index();
        if req.leader_commit > core.commit_index {
            core.commit_index = req.leader_commit.min(last_new);
        }
        self.apply_committed(&mut core);

        let resp = AppendEntriesResponse {
            term: core.current_term,
            success: true,
            last_log_index: last_new,
        };
        let hard_state = core.hard_state();
        drop(core);
        if term_changed {
            self.persist_hard_state(&hard_state).await;
        }
        Ok(resp)
    }

    async fn propose_value(&self, payload: Vec<u8>) -> ConsensusResult<ProposeReceipt> {
        self.propose_entry(EntryPayload::Command(payload)).await
    }

    async fn add_node(&self, node_id: String) -> ConsensusResult<ProposeReceipt> {
        self.propose_entry(EntryPayload::AddNode(node_id)).await
    }

    async fn remove_node(&self, node_id: String) -> ConsensusResult<ProposeReceipt> {
        self.propose_entry(EntryPayload::RemoveNode(node_id)).await
    }

    async fn status(&self) -> RaftStatus {
        let core = self.core.lock().await;
        RaftStatus {
            node_id: self.config.node_id.clone(),
            role: core.role,
            current_term: core.current_term,
            voted_for: core.voted_for.clone(),
            commit_index: core.commit_index,
            last_applied: core.last_applied,
            last_log_index: core.last_log_index(),
            last_log_term: core.last_log_term(),
            leader_id: core.leader_id.clone(),
            members: core.members.clone(),
        }
    }
}

fn random_timeout((low, high): (u64, u64)) -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(low..=high))
}
