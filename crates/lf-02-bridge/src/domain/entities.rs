//! # Domain Entities
//!
//! Core entities for cross-chain bridge coordination: the transfer, its
//! oracle voting round, and the wire-facing views.

use serde::{Deserialize, Serialize};
use shared_types::{rfc3339, BridgeStatus, ChainId, Storable};
use std::collections::HashMap;

/// A request to open a cross-chain transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeTransferRequest {
    /// Caller-chosen unique transfer id.
    pub bridge_id: String,
    /// Origin chain.
    pub source_chain: ChainId,
    /// Destination chain.
    pub dest_chain: ChainId,
    /// Asset contract address on the source chain.
    pub asset_address: String,
    /// Decimal amount string.
    pub amount: String,
    /// Recipient address on the destination chain.
    pub recipient: String,
    /// Hash of the locking transaction on the source chain.
    pub source_tx_hash: String,
    /// Opaque proof that funds are locked.
    pub lock_proof: Vec<u8>,
    /// Seconds until the transfer becomes refundable. 0 selects the
    /// configured default.
    pub timeout_seconds: u64,
    /// Oracle committee attesting this transfer.
    pub oracle_set: Vec<String>,
}

/// A cross-chain transfer tracked by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeTransfer {
    /// Unique transfer id.
    pub bridge_id: String,
    /// Origin chain.
    pub source_chain: ChainId,
    /// Destination chain.
    pub dest_chain: ChainId,
    /// Asset contract address on the source chain.
    pub asset_address: String,
    /// Decimal amount string.
    pub amount: String,
    /// Recipient address on the destination chain.
    pub recipient: String,
    /// Opaque proof that funds are locked.
    pub lock_proof: Vec<u8>,
    /// Hash of the locking transaction on the source chain.
    pub source_tx_hash: String,
    /// Seconds until the transfer becomes refundable.
    pub timeout_seconds: u64,
    /// Creation time, unix seconds.
    pub created_at: u64,
    /// Current status. Mutated only through the coordinator's
    /// transition table.
    pub status: BridgeStatus,
    /// Last status change, unix seconds.
    pub updated_at: u64,
    /// Destination transaction hash, set on execution.
    pub dest_tx_hash: Option<String>,
    /// True once the destination callback reached quorum.
    pub finalized: bool,
    /// Populated for `Refunded`/`Failed`.
    pub error: Option<String>,
}

impl BridgeTransfer {
    /// Whether the transfer has outlived its timeout at `now`.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_at) > self.timeout_seconds
    }
}

impl Storable for BridgeTransfer {
    type Id = String;
    type Status = BridgeStatus;

    fn id(&self) -> String {
        self.bridge_id.clone()
    }

    fn status(&self) -> BridgeStatus {
        self.status
    }
}

/// One oracle's current vote in a round. Re-votes overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleVote {
    /// Whether the oracle approves the transfer.
    pub approved: bool,
    /// Free-form reason.
    pub reason: String,
    /// Vote time, unix seconds.
    pub voted_at: u64,
}

/// The voting round attached to one transfer.
///
/// `required_approvals = ⌊2n/3⌋ + 1` over an `n`-oracle committee:
/// tolerates up to `⌊(n-1)/3⌋` Byzantine members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleVotingRound {
    /// The transfer this round attests.
    pub bridge_id: String,
    /// Committee members.
    pub oracle_set: Vec<String>,
    /// Supermajority threshold.
    pub required_approvals: u32,
    votes: HashMap<String, OracleVote>,
}

impl OracleVotingRound {
    /// Open an empty round for `bridge_id` over `oracle_set`.
    #[must_use]
    pub fn new(bridge_id: impl Into<String>, oracle_set: Vec<String>) -> Self {
        let required_approvals = supermajority(oracle_set.len());
        Self {
            bridge_id: bridge_id.into(),
            oracle_set,
            required_approvals,
            votes: HashMap::new(),
        }
    }

    /// Record (or overwrite) one oracle's vote.
    ///
    /// Votes from addresses outside the committee are refused so the
    /// tally can never exceed the committee size.
    pub fn record_vote(
        &mut self,
        oracle_address: &str,
        vote: OracleVote,
    ) -> Result<(), UnknownOracle> {
        if !self.oracle_set.iter().any(|o| o == oracle_address) {
            return Err(UnknownOracle(oracle_address.to_string()));
        }
        self.votes.insert(oracle_address.to_string(), vote);
        Ok(())
    }

    /// Current approval count.
    #[must_use]
    pub fn approval_count(&self) -> u32 {
        self.votes.values().filter(|v| v.approved).count() as u32
    }

    /// Current rejection count.
    #[must_use]
    pub fn rejection_count(&self) -> u32 {
        self.votes.values().filter(|v| !v.approved).count() as u32
    }

    /// Whether the supermajority threshold is met.
    #[must_use]
    pub fn consensus_reached(&self) -> bool {
        self.approval_count() >= self.required_approvals
    }
}

/// A vote arrived from an address outside the committee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOracle(pub String);

/// Supermajority threshold `⌊2n/3⌋ + 1` for an `n`-member committee.
#[must_use]
pub fn supermajority(committee_size: usize) -> u32 {
    (2 * committee_size / 3) as u32 + 1
}

/// Wire view of a transfer's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStatusUpdate {
    /// Transfer id.
    pub bridge_id: String,
    /// Origin chain.
    pub source_chain: ChainId,
    /// Destination chain.
    pub dest_chain: ChainId,
    /// Decimal amount string.
    pub amount: String,
    /// Current status.
    pub status: BridgeStatus,
    /// Approvals recorded so far.
    pub oracle_confirmations: u32,
    /// Supermajority threshold.
    pub required_confirmations: u32,
    /// Destination transaction hash, once executed.
    pub dest_tx_hash: Option<String>,
    /// True once the destination callback reached quorum.
    pub finalized: bool,
    /// Last change, RFC3339.
    pub updated_at: String,
    /// Populated for `Refunded`/`Failed`.
    pub error: Option<String>,
}

impl BridgeStatusUpdate {
    /// Project a transfer and its round into the wire view.
    #[must_use]
    pub fn from_parts(transfer: &BridgeTransfer, round: &OracleVotingRound) -> Self {
        Self {
            bridge_id: transfer.bridge_id.clone(),
            source_chain: transfer.source_chain,
            dest_chain: transfer.dest_chain,
            amount: transfer.amount.clone(),
            status: transfer.status,
            oracle_confirmations: round.approval_count(),
            required_confirmations: round.required_approvals,
            dest_tx_hash: transfer.dest_tx_hash.clone(),
            finalized: transfer.finalized,
            updated_at: rfc3339(transfer.updated_at),
            error: transfer.error.clone(),
        }
    }
}

/// One inbound message on the verification stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleVoteMessage {
    /// Transfer the vote concerns.
    pub bridge_id: String,
    /// Voting oracle.
    pub oracle_address: String,
    /// Approve or reject.
    pub approved: bool,
    /// Free-form reason.
    pub reason: String,
}

/// Pushed on the verification stream when a round first reaches
/// supermajority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Transfer id.
    pub bridge_id: String,
    /// Always true when pushed.
    pub consensus_reached: bool,
    /// Approvals at the consensus edge.
    pub approved_count: u32,
    /// Rejections at the consensus edge.
    pub rejected_count: u32,
}

/// Entry on the pending-transfer queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransferNotice {
    /// Transfer id.
    pub bridge_id: String,
    /// Origin chain, for the stream-side filter.
    pub source_chain: ChainId,
}

/// Summary reply for the batch-ingest stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Transfers created.
    pub accepted: u32,
    /// Transfers refused.
    pub rejected: u32,
    /// Ids of refused transfers.
    pub failed_ids: Vec<String>,
    /// One message per refusal, in arrival order.
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(n: usize) -> OracleVotingRound {
        let oracles = (0..n).map(|i| format!("o{i}")).collect();
        OracleVotingRound::new("b-1", oracles)
    }

    fn approve(at: u64) -> OracleVote {
        OracleVote {
            approved: true,
            reason: "ok".to_string(),
            voted_at: at,
        }
    }

    #[test]
    fn test_supermajority_thresholds() {
        assert_eq!(supermajority(1), 1);
        assert_eq!(supermajority(3), 3);
        assert_eq!(supermajority(4), 3);
        assert_eq!(supermajority(7), 5);
    }

    #[test]
    fn test_round_counts_votes() {
        let mut r = round(4);
        r.record_vote("o0", approve(1)).unwrap();
        r.record_vote(
            "o1",
            OracleVote {
                approved: false,
                reason: "bad proof".to_string(),
                voted_at: 2,
            },
        )
        .unwrap();

        assert_eq!(r.approval_count(), 1);
        assert_eq!(r.rejection_count(), 1);
        assert!(!r.consensus_reached());
    }

    #[test]
    fn test_revote_overwrites() {
        let mut r = round(3);
        r.record_vote(
            "o0",
            OracleVote {
                approved: false,
                reason: "unsure".to_string(),
                voted_at: 1,
            },
        )
        .unwrap();
        r.record_vote("o0", approve(2)).unwrap();

        assert_eq!(r.approval_count(), 1);
        assert_eq!(r.rejection_count(), 0);
    }

    #[test]
    fn test_unknown_oracle_refused() {
        let mut r = round(3);
        let err = r.record_vote("outsider", approve(1)).unwrap_err();
        assert_eq!(err, UnknownOracle("outsider".to_string()));
        assert_eq!(r.approval_count(), 0);
    }

    #[test]
    fn test_tally_bounded_by_committee() {
        let mut r = round(3);
        for i in 0..3 {
            r.record_vote(&format!("o{i}"), approve(i as u64)).unwrap();
        }
        // Re-votes do not inflate the tally.
        r.record_vote("o0", approve(9)).unwrap();
        assert!(r.approval_count() + r.rejection_count() <= 3);
        assert!(r.consensus_reached());
    }

    #[test]
    fn test_transfer_expiry() {
        let transfer = BridgeTransfer {
            bridge_id: "b-1".to_string(),
            source_chain: ChainId::Ethereum,
            dest_chain: ChainId::Fabric,
            asset_address: "0xasset".to_string(),
            amount: "10.5".to_string(),
            recipient: "0xrcpt".to_string(),
            lock_proof: vec![1],
            source_tx_hash: "0xsrc".to_string(),
            timeout_seconds: 60,
            created_at: 1_000,
            status: BridgeStatus::Pending,
            updated_at: 1_000,
            dest_tx_hash: None,
            finalized: false,
            error: None,
        };
        assert!(!transfer.is_expired(1_060));
        assert!(transfer.is_expired(1_061));
    }
}
