//! # Fabric Events
//!
//! Defines all event types that flow through the observer bus, the topics
//! they belong to, and the total filter predicate evaluated inside the
//! fan-out path.

use serde::{Deserialize, Serialize};
use shared_types::{unix_now_millis, BridgeStatus, ChainId, NodeRole, TransactionStatus};
use uuid::Uuid;

/// An immutable event as delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event id.
    pub event_id: Uuid,
    /// Publication time in unix milliseconds.
    pub timestamp_ms: u64,
    /// The typed payload.
    pub payload: EventPayload,
}

impl Event {
    /// Wrap a payload, stamping id and publication time.
    #[must_use]
    pub fn new(payload: EventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp_ms: unix_now_millis(),
            payload,
        }
    }

    /// The topic this event belongs to.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        self.payload.topic()
    }
}

/// All payloads that can be published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // =========================================================================
    // TRANSACTIONS
    // =========================================================================
    /// A transaction entered the pending set.
    TransactionSubmitted {
        /// Deterministic transaction id.
        tx_id: String,
        /// Caller-supplied hash.
        tx_hash: String,
        /// Status at submission (always `Pending` today).
        status: TransactionStatus,
    },

    /// A transaction moved through its lifecycle.
    TransactionStatusChanged {
        /// Deterministic transaction id.
        tx_id: String,
        /// New status.
        status: TransactionStatus,
        /// Confirmation count at the time of the change.
        confirmations: u32,
    },

    // =========================================================================
    // BRIDGE
    // =========================================================================
    /// A transfer was created and awaits oracle consensus.
    BridgeTransferInitiated {
        /// Transfer id.
        bridge_id: String,
        /// Origin chain.
        source_chain: ChainId,
        /// Destination chain.
        dest_chain: ChainId,
    },

    /// A transfer changed status.
    BridgeStatusChanged {
        /// Transfer id.
        bridge_id: String,
        /// New status.
        status: BridgeStatus,
        /// Approvals recorded so far.
        approvals: u32,
        /// Approvals required for consensus.
        required: u32,
        /// Populated for `Refunded`/`Failed`.
        error: Option<String>,
    },

    /// The oracle committee reached supermajority on a transfer.
    BridgeConsensusReached {
        /// Transfer id.
        bridge_id: String,
        /// Approval votes at the consensus edge.
        approved_count: u32,
        /// Rejection votes at the consensus edge.
        rejected_count: u32,
    },

    // =========================================================================
    // CONSENSUS
    // =========================================================================
    /// A node changed role.
    ConsensusRoleChanged {
        /// Node id.
        node_id: String,
        /// New role.
        role: NodeRole,
        /// Term in which the change happened.
        term: u64,
    },

    /// A log index was committed and applied.
    ConsensusCommitted {
        /// Node id that observed the commit.
        node_id: String,
        /// Committed log index.
        index: u64,
        /// Term of the committed entry.
        term: u64,
    },

    // =========================================================================
    // VALIDATORS
    // =========================================================================
    /// Point-in-time validator status pushed to periodic subscribers.
    ValidatorStatusUpdate {
        /// Validator id.
        validator_id: String,
        /// Whether the validator is in the active set.
        active: bool,
        /// Total stake in base units.
        stake: u64,
    },

    // =========================================================================
    // ORDERING
    // =========================================================================
    /// A batch was scored and reordered.
    OrderingBatchOptimized {
        /// Result id.
        result_id: Uuid,
        /// Number of transactions in the batch.
        batch_size: usize,
        /// Mean score across the batch.
        avg_score: f64,
        /// Confidence in `[0.5, 1.0]`.
        confidence: f64,
    },

    /// A new model snapshot was installed.
    ModelInstalled {
        /// Model family name.
        model_name: String,
        /// Monotonic snapshot version.
        version: u64,
        /// Accuracy that cleared the accept threshold.
        accuracy: f64,
    },
}

impl EventPayload {
    /// Get the topic for this payload (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TransactionSubmitted { .. } | Self::TransactionStatusChanged { .. } => {
                EventTopic::Transactions
            }
            Self::BridgeTransferInitiated { .. }
            | Self::BridgeStatusChanged { .. }
            | Self::BridgeConsensusReached { .. } => EventTopic::Bridge,
            Self::ConsensusRoleChanged { .. } | Self::ConsensusCommitted { .. } => {
                EventTopic::Consensus
            }
            Self::ValidatorStatusUpdate { .. } => EventTopic::Validators,
            Self::OrderingBatchOptimized { .. } | Self::ModelInstalled { .. } => {
                EventTopic::Ordering
            }
        }
    }

    /// The chain this payload concerns, when it concerns one.
    #[must_use]
    pub fn chain(&self) -> Option<ChainId> {
        match self {
            Self::BridgeTransferInitiated { source_chain, .. } => Some(*source_chain),
            _ => None,
        }
    }

    /// The primary entity id this payload concerns, when it has one.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::TransactionSubmitted { tx_id, .. }
            | Self::TransactionStatusChanged { tx_id, .. } => Some(tx_id),
            Self::BridgeTransferInitiated { bridge_id, .. }
            | Self::BridgeStatusChanged { bridge_id, .. }
            | Self::BridgeConsensusReached { bridge_id, .. } => Some(bridge_id),
            Self::ConsensusRoleChanged { node_id, .. }
            | Self::ConsensusCommitted { node_id, .. } => Some(node_id),
            Self::ValidatorStatusUpdate { validator_id, .. } => Some(validator_id),
            Self::OrderingBatchOptimized { .. } | Self::ModelInstalled { .. } => None,
        }
    }
}

/// Event topics for subscription routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Transaction lifecycle events.
    Transactions,
    /// Bridge transfer events.
    Bridge,
    /// Consensus role/commit events.
    Consensus,
    /// Validator status pushes.
    Validators,
    /// Ordering and model events.
    Ordering,
}

/// Filter for subscribing to specific events.
///
/// Every field is a conjunct; an empty field means "match all". The
/// default filter therefore matches everything on its topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Chain selectors to include. Empty means all chains.
    pub chains: Vec<ChainId>,
    /// Entity ids to include. Empty means all entities.
    pub entity_ids: Vec<String>,
}

impl EventFilter {
    /// A filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// A filter for specific entity ids.
    #[must_use]
    pub fn entities(entity_ids: Vec<String>) -> Self {
        Self {
            entity_ids,
            ..Self::default()
        }
    }

    /// Check whether an event matches this filter. Total over all events.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let topic_match = self.topics.is_empty() || self.topics.contains(&event.topic());

        let chain_match = self.chains.is_empty()
            || event
                .payload
                .chain()
                .map(|c| self.chains.contains(&c))
                .unwrap_or(true);

        let entity_match = self.entity_ids.is_empty()
            || event
                .payload
                .entity_id()
                .map(|id| self.entity_ids.iter().any(|want| want == id))
                .unwrap_or(true);

        topic_match && chain_match && entity_match
    }
}
