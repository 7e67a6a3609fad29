//! Bridge Coordinator - Core business logic
//!
//! # Architecture
//!
//! - Per-transfer state sits behind a per-`bridge_id` async mutex;
//!   operations on different transfers run in parallel, operations on
//!   the same transfer serialize.
//! - Status only moves through the shared transition table; a persist
//!   failure aborts the transition before it becomes visible.
//! - The timeout refund is lazy: it runs as a side effect of the next
//!   status query, not from a preemptive timer.
//! - Oracle votes never fail a round: unknown transfer ids and unknown
//!   oracles are logged and ignored.

use crate::config::BridgeConfig;
use crate::domain::{
    status_machine, BridgeError, BridgeResult, BridgeStatusUpdate, BridgeTransfer,
    BridgeTransferRequest, OracleVote, OracleVotingRound, PendingTransferNotice,
    VerificationResult,
};
use crate::ports::inbound::BridgeApi;
use crate::ports::outbound::{ProofVerifier, TimeSource};
use async_trait::async_trait;
use fabric_telemetry::metrics::{
    BRIDGE_CONSENSUS_REACHED, BRIDGE_REFUNDS, BRIDGE_STATUS_TRANSITIONS,
    BRIDGE_TRANSFERS_INITIATED, BRIDGE_VOTES, EVENTS_DROPPED,
};
use parking_lot::RwLock;
use shared_bus::{BoundedEventQueue, Event, EventPayload, ObserverBus};
use shared_types::{BridgeStatus, Repository, StateMachine};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

mod streams;
pub use streams::StatusMonitor;

#[cfg(test)]
mod tests;

/// A transfer and its voting round, guarded together.
pub(crate) struct TransferState {
    pub(crate) transfer: BridgeTransfer,
    pub(crate) round: OracleVotingRound,
}

/// Coordinates cross-chain transfers against their oracle committees.
pub struct BridgeCoordinator {
    config: BridgeConfig,
    machine: StateMachine<BridgeStatus>,
    transfers: RwLock<HashMap<String, Arc<Mutex<TransferState>>>>,
    repository: Arc<dyn Repository<BridgeTransfer>>,
    verifier: Arc<dyn ProofVerifier>,
    time: Arc<dyn TimeSource>,
    bus: Arc<ObserverBus>,
    pending_queue: Arc<BoundedEventQueue<PendingTransferNotice>>,
}

impl BridgeCoordinator {
    /// Create a coordinator.
    pub fn new(
        config: BridgeConfig,
        repository: Arc<dyn Repository<BridgeTransfer>>,
        verifier: Arc<dyn ProofVerifier>,
        time: Arc<dyn TimeSource>,
        bus: Arc<ObserverBus>,
    ) -> Self {
        let pending_queue = Arc::new(BoundedEventQueue::new(config.pending_queue_capacity));
        Self {
            config,
            machine: status_machine(),
            transfers: RwLock::new(HashMap::new()),
            repository,
            verifier,
            time,
            bus,
            pending_queue,
        }
    }

    /// The observer bus carrying status updates.
    #[must_use]
    pub fn bus(&self) -> Arc<ObserverBus> {
        Arc::clone(&self.bus)
    }

    pub(crate) fn pending_queue(&self) -> Arc<BoundedEventQueue<PendingTransferNotice>> {
        Arc::clone(&self.pending_queue)
    }

    fn entry(&self, bridge_id: &str) -> Option<Arc<Mutex<TransferState>>> {
        self.transfers.read().get(bridge_id).cloned()
    }

    fn validate(&self, req: &BridgeTransferRequest) -> BridgeResult<()> {
        if req.bridge_id.trim().is_empty() {
            return Err(BridgeError::InvalidRequest("empty bridge id".to_string()));
        }
        if req.recipient.trim().is_empty() {
            return Err(BridgeError::InvalidRequest("empty recipient".to_string()));
        }
        if req.oracle_set.is_empty() {
            return Err(BridgeError::InvalidRequest("empty oracle set".to_string()));
        }
        if req.amount.parse::<f64>().map(|a| a <= 0.0).unwrap_or(true) {
            return Err(BridgeError::InvalidRequest(format!(
                "amount is not a positive decimal: {}",
                req.amount
            )));
        }
        Ok(())
    }

    /// Move a transfer through the table, persisting the new state
    /// before it becomes visible. A refused write leaves memory
    /// untouched.
    async fn apply_transition(
        &self,
        state: &mut TransferState,
        to: BridgeStatus,
        mutate: impl FnOnce(&mut BridgeTransfer),
    ) -> BridgeResult<()> {
        self.machine.transition(state.transfer.status, to)?;

        let mut next = state.transfer.clone();
        next.status = to;
        next.updated_at = self.time.now();
        mutate(&mut next);
        self.repository.persist(&next).await?;
        state.transfer = next;

        BRIDGE_STATUS_TRANSITIONS
            .with_label_values(&[&to.to_string()])
            .inc();
        self.bus.publish(&Event::new(EventPayload::BridgeStatusChanged {
            bridge_id: state.transfer.bridge_id.clone(),
            status: to,
            approvals: state.round.approval_count(),
            required: state.round.required_approvals,
            error: state.transfer.error.clone(),
        }));

        info!(
            bridge_id = %state.transfer.bridge_id,
            status = %to,
            "Transfer status changed"
        );
        Ok(())
    }

    /// Relay the transfer if its round has supermajority and it is still
    /// pending. Returns the verification result on the consensus edge.
    async fn maybe_relay(&self, state: &mut TransferState) -> Option<VerificationResult> {
        if state.transfer.status != BridgeStatus::Pending || !state.round.consensus_reached() {
            return None;
        }
        if let Err(e) = self
            .apply_transition(state, BridgeStatus::Relayed, |_| {})
            .await
        {
            warn!(
                bridge_id = %state.transfer.bridge_id,
                error = %e,
                "Relay transition deferred"
            );
            return None;
        }

        let result = VerificationResult {
            bridge_id: state.transfer.bridge_id.clone(),
            consensus_reached: true,
            approved_count: state.round.approval_count(),
            rejected_count: state.round.rejection_count(),
        };
        BRIDGE_CONSENSUS_REACHED.inc();
        self.bus
            .publish(&Event::new(EventPayload::BridgeConsensusReached {
                bridge_id: result.bridge_id.clone(),
                approved_count: result.approved_count,
                rejected_count: result.rejected_count,
            }));
        Some(result)
    }

    /// Refund the transfer if it is past its timeout and not terminal.
    async fn maybe_refund(&self, state: &mut TransferState) -> BridgeResult<()> {
        let now = self.time.now();
        if state.transfer.status.is_terminal() || !state.transfer.is_expired(now) {
            return Ok(());
        }
        let timeout = state.transfer.timeout_seconds;
        self.apply_transition(state, BridgeStatus::Refunded, |t| {
            t.error = Some(format!("Transfer timeout after {timeout}s"));
        })
        .await?;
        BRIDGE_REFUNDS.inc();
        Ok(())
    }

    /// Mark the transfer settled after destination confirmation.
    pub async fn confirm_settlement(&self, bridge_id: &str) -> BridgeResult<BridgeStatusUpdate> {
        let entry = self
            .entry(bridge_id)
            .ok_or_else(|| BridgeError::UnknownBridge(bridge_id.to_string()))?;
        let mut state = entry.lock().await;
        self.apply_transition(&mut state, BridgeStatus::Settled, |_| {})
            .await?;
        Ok(BridgeStatusUpdate::from_parts(&state.transfer, &state.round))
    }

    /// Mark the transfer failed on an unrecoverable error signal.
    pub async fn fail_transfer(
        &self,
        bridge_id: &str,
        reason: &str,
    ) -> BridgeResult<BridgeStatusUpdate> {
        let entry = self
            .entry(bridge_id)
            .ok_or_else(|| BridgeError::UnknownBridge(bridge_id.to_string()))?;
        let mut state = entry.lock().await;
        let reason = reason.to_string();
        self.apply_transition(&mut state, BridgeStatus::Failed, move |t| {
            t.error = Some(reason);
        })
        .await?;
        Ok(BridgeStatusUpdate::from_parts(&state.transfer, &state.round))
    }
}

#[async_trait]
impl BridgeApi for BridgeCoordinator {
    async fn initiate_transfer(
        &self,
        req: BridgeTransferRequest,
    ) -> BridgeResult<BridgeStatusUpdate> {
        self.validate(&req)?;
        if !self.verifier.verify_lock_proof(&req) {
            return Err(BridgeError::ProofRejected(req.bridge_id));
        }
        if self.transfers.read().contains_key(&req.bridge_id) {
            return Err(BridgeError::DuplicateBridge(req.bridge_id));
        }

        let now = self.time.now();
        let timeout_seconds = if req.timeout_seconds == 0 {
            self.config.default_timeout_seconds
        } else {
            req.timeout_seconds
        };
        let transfer = BridgeTransfer {
            bridge_id: req.bridge_id.clone(),
            source_chain: req.source_chain,
            dest_chain: req.dest_chain,
            asset_address: req.asset_address,
            amount: req.amount,
            recipient: req.recipient,
            lock_proof: req.lock_proof,
            source_tx_hash: req.source_tx_hash,
            timeout_seconds,
            created_at: now,
            status: BridgeStatus::Pending,
            updated_at: now,
            dest_tx_hash: None,
            finalized: false,
            error: None,
        };
        let round = OracleVotingRound::new(&req.bridge_id, req.oracle_set);

        // The transfer exists once the store accepted it, not before.
        self.repository.persist(&transfer).await?;

        {
            let mut transfers = self.transfers.write();
            if transfers.contains_key(&req.bridge_id) {
                return Err(BridgeError::DuplicateBridge(req.bridge_id));
            }
            transfers.insert(
                req.bridge_id.clone(),
                Arc::new(Mutex::new(TransferState {
                    transfer: transfer.clone(),
                    round: round.clone(),
                })),
            );
        }

        if !self.pending_queue.offer(PendingTransferNotice {
            bridge_id: transfer.bridge_id.clone(),
            source_chain: transfer.source_chain,
        }) {
            EVENTS_DROPPED.with_label_values(&["bridge_pending"]).inc();
        }

        BRIDGE_TRANSFERS_INITIATED.inc();
        self.bus
            .publish(&Event::new(EventPayload::BridgeTransferInitiated {
                bridge_id: transfer.bridge_id.clone(),
                source_chain: transfer.source_chain,
                dest_chain: transfer.dest_chain,
            }));
        self.bus.publish(&Event::new(EventPayload::BridgeStatusChanged {
            bridge_id: transfer.bridge_id.clone(),
            status: BridgeStatus::Pending,
            approvals: 0,
            required: round.required_approvals,
            error: None,
        }));

        info!(
            bridge_id = %transfer.bridge_id,
            source_chain = %transfer.source_chain,
            dest_chain = %transfer.dest_chain,
            oracles = round.oracle_set.len(),
            required = round.required_approvals,
            "Transfer initiated"
        );
        Ok(BridgeStatusUpdate::from_parts(&transfer, &round))
    }

    async fn submit_vote(
        &self,
        bridge_id: &str,
        oracle_address: &str,
        approved: bool,
        reason: &str,
    ) -> Option<VerificationResult> {
        let Some(entry) = self.entry(bridge_id) else {
            // Votes for unknown transfers never error the stream.
            debug!(bridge_id, oracle = oracle_address, "Vote for unknown transfer ignored");
            return None;
        };
        let mut state = entry.lock().await;

        if state.transfer.status.is_terminal() {
            debug!(
                bridge_id,
                status = %state.transfer.status,
                "Vote on terminal transfer ignored"
            );
            return None;
        }

        let vote = OracleVote {
            approved,
            reason: reason.to_string(),
            voted_at: self.time.now(),
        };
        if let Err(unknown) = state.round.record_vote(oracle_address, vote) {
            warn!(bridge_id, oracle = %unknown.0, "Vote from outside the committee ignored");
            return None;
        }
        BRIDGE_VOTES
            .with_label_values(&[if approved { "approved" } else { "rejected" }])
            .inc();

        self.maybe_relay(&mut state).await
    }

    async fn execute_bridge_callback(
        &self,
        bridge_id: &str,
        oracle_address: &str,
        dest_tx_hash: &str,
    ) -> BridgeResult<BridgeStatusUpdate> {
        let entry = self
            .entry(bridge_id)
            .ok_or_else(|| BridgeError::UnknownBridge(bridge_id.to_string()))?;
        let mut state = entry.lock().await;

        // Terminal transfers ignore further callbacks.
        if state.transfer.status.is_terminal() || state.transfer.status == BridgeStatus::Executed {
            return Ok(BridgeStatusUpdate::from_parts(&state.transfer, &state.round));
        }

        let vote = OracleVote {
            approved: true,
            reason: "Execution confirmed".to_string(),
            voted_at: self.time.now(),
        };
        if let Err(unknown) = state.round.record_vote(oracle_address, vote) {
            warn!(bridge_id, oracle = %unknown.0, "Callback from outside the committee ignored");
            return Ok(BridgeStatusUpdate::from_parts(&state.transfer, &state.round));
        }
        BRIDGE_VOTES.with_label_values(&["approved"]).inc();

        // A callback can be the vote that completes the round.
        self.maybe_relay(&mut state).await;

        if state.transfer.status == BridgeStatus::Relayed
            && state.round.approval_count() >= state.round.required_approvals
        {
            let dest = dest_tx_hash.to_string();
            self.apply_transition(&mut state, BridgeStatus::Executed, move |t| {
                t.dest_tx_hash = Some(dest);
                t.finalized = true;
            })
            .await?;
        }

        Ok(BridgeStatusUpdate::from_parts(&state.transfer, &state.round))
    }

    async fn get_transfer_status(&self, bridge_id: &str) -> BridgeResult<BridgeStatusUpdate> {
        let entry = self
            .entry(bridge_id)
            .ok_or_else(|| BridgeError::UnknownBridge(bridge_id.to_string()))?;
        let mut state = entry.lock().await;
        self.maybe_refund(&mut state).await?;
        Ok(BridgeStatusUpdate::from_parts(&state.transfer, &state.round))
    }
}
