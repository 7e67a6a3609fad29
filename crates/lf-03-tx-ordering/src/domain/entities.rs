//! # Domain Entities
//!
//! Core entities for score-driven transaction ordering and the online
//! learning loop.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A transaction as submitted for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionProfile {
    /// Transaction id.
    pub tx_id: String,
    /// Caller-assigned priority.
    pub priority: u32,
    /// Offered gas price.
    pub gas_price: u64,
    /// Ids of transactions this one depends on.
    pub dependencies: Vec<String>,
}

/// A transaction with its derived score.
///
/// The score is a pure function of the profile; two equal profiles
/// always score the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTransaction {
    /// The submitted profile.
    pub profile: TransactionProfile,
    /// Derived ordering score.
    pub score: f64,
}

/// The single reply of a batch optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedBatch {
    /// Result id.
    pub result_id: Uuid,
    /// Transaction ids, best first.
    pub optimized_tx_order: Vec<String>,
    /// Mean score across the batch.
    pub avg_score: f64,
    /// Confidence in `[0.5, 1.0]`; low score variance means high
    /// confidence.
    pub confidence: f64,
    /// Human-readable summary of the strategy applied.
    pub optimization_reason: String,
    /// Wall-clock time spent ordering.
    pub processing_time_ms: u64,
    /// Number of transactions in the batch.
    pub batch_size: usize,
    /// Estimated throughput gain over submission order.
    pub estimated_throughput_gain_percent: f64,
}

/// One observation for the online learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingDataPoint {
    /// The order that was served.
    pub ordered_tx_ids: Vec<String>,
    /// Quality of that order in `[0, 1]`.
    pub quality_score: f64,
    /// Observation time, unix millis.
    pub timestamp: u64,
}

/// A completed transaction reported back after block execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTx {
    /// Transaction id. Empty ids mark a malformed entry.
    pub tx_id: String,
    /// Observed execution quality in `[0, 1]`.
    pub quality_score: f64,
}

impl CompletedTx {
    /// Whether the entry is usable for training. Malformed entries are
    /// counted and skipped, never fatal.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.tx_id.is_empty()
            && self.quality_score.is_finite()
            && (0.0..=1.0).contains(&self.quality_score)
    }
}

/// An installed model version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Model family name.
    pub model_name: String,
    /// Monotonic version; each install bumps it by exactly one.
    pub version: u64,
    /// Opaque serialized parameters.
    pub weights: Vec<u8>,
    /// Accuracy that cleared the accept threshold.
    pub accuracy: f64,
    /// Install time, unix millis.
    pub installed_at: u64,
}

impl ModelSnapshot {
    /// The bootstrap model before any update has been accepted.
    #[must_use]
    pub fn initial(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            version: 0,
            weights: Vec::new(),
            accuracy: 0.5,
            installed_at: 0,
        }
    }
}
