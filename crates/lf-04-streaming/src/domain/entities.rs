//! # Domain Entities
//!
//! Wire-facing shapes of the streaming services.

use serde::{Deserialize, Serialize};
use shared_types::TransactionStatus;

/// A transaction submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSubmission {
    /// Caller-supplied transaction hash.
    pub tx_hash: String,
    /// Opaque transaction payload.
    pub payload: Vec<u8>,
    /// Signature over the payload.
    pub signature: Vec<u8>,
    /// Signing identity.
    pub signer: String,
    /// Signer nonce.
    pub nonce: u64,
}

/// A tracked transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Deterministic id derived from `(tx_hash, payload)`.
    pub tx_id: String,
    /// Caller-supplied hash.
    pub tx_hash: String,
    /// Signing identity.
    pub signer: String,
    /// Signer nonce.
    pub nonce: u64,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Confirmation count.
    pub confirmations: u32,
    /// Including block, once known.
    pub block_height: Option<u64>,
    /// Submission time, unix seconds.
    pub submitted_at: u64,
}

/// Status view returned by queries and embedded in receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusView {
    /// Deterministic transaction id.
    pub tx_id: String,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Confirmation count.
    pub confirmations: u32,
    /// Including block hash, once known.
    pub block_hash: Option<String>,
    /// Whether the transaction is irreversible.
    pub finalized: bool,
    /// Last change, RFC3339.
    pub updated_at: String,
}

/// Reply to a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Deterministic transaction id.
    pub tx_id: String,
    /// Current status view.
    pub status: TransactionStatusView,
    /// Including block, once known.
    pub block_height: Option<u64>,
    /// Gas consumed; zero until execution.
    pub gas_used: u64,
    /// Submission time, RFC3339.
    pub timestamp: String,
    /// Confirmation count.
    pub confirmation_count: u32,
}

/// Summary reply for the batch-submit stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSubmitSummary {
    /// Submissions accepted (idempotent replays included).
    pub accepted: u32,
    /// Submissions refused.
    pub rejected: u32,
    /// One message per refusal, in arrival order.
    pub errors: Vec<String>,
}

/// A validator as tracked by the validator service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorInfo {
    /// Validator id.
    pub validator_id: String,
    /// Whether the validator is in the active set.
    pub active: bool,
    /// Total stake in base units.
    pub stake: u64,
}

/// A periodic-update subscription request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorSubscriptionRequest {
    /// Subscriber identity, for logs.
    pub client_id: String,
    /// Push cadence; 0 selects the configured default.
    pub update_interval_ms: u64,
    /// Event type names to include. Empty means all.
    pub event_types: Vec<String>,
    /// Validator ids to include. Empty means all.
    pub validator_ids: Vec<String>,
}
