//! # Transaction Service
//!
//! The transaction-facing call patterns: unary submit/status, client
//! stream batch ingest, and server-stream event subscriptions.
//!
//! Submission is idempotent: the transaction id is a pure digest of
//! `(tx_hash, payload)`, so resubmitting the same pair yields the same
//! id and does not duplicate the record.

use crate::config::StreamingConfig;
use crate::domain::{
    BatchSubmitSummary, StreamError, StreamResult, TransactionReceipt, TransactionRecord,
    TransactionStatusView, TransactionSubmission,
};
use crate::ports::inbound::TransactionApi;
use crate::subscription::{EventSubscription, SubscriptionManager};
use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use shared_bus::{Event, EventFilter, EventPayload, EventTopic, ObserverBus};
use shared_types::{rfc3339, unix_now_secs, StateMachine, TransactionStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The transaction lifecycle table: strictly forward.
fn lifecycle_machine() -> StateMachine<TransactionStatus> {
    StateMachine::builder()
        .allow(TransactionStatus::Pending, [TransactionStatus::Validated])
        .allow(TransactionStatus::Validated, [TransactionStatus::Included])
        .allow(TransactionStatus::Included, [TransactionStatus::Confirmed])
        .allow(TransactionStatus::Confirmed, [TransactionStatus::Finalized])
        .build()
}

/// Transaction submission, tracking, and event fan-out.
pub struct TransactionService {
    records: RwLock<HashMap<String, TransactionRecord>>,
    lifecycle: StateMachine<TransactionStatus>,
    subscriptions: SubscriptionManager,
    bus: Arc<ObserverBus>,
}

impl TransactionService {
    /// Create a service publishing on `bus`.
    #[must_use]
    pub fn new(config: StreamingConfig, bus: Arc<ObserverBus>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            lifecycle: lifecycle_machine(),
            subscriptions: SubscriptionManager::new(Arc::clone(&bus), config, "transactions"),
            bus,
        }
    }

    /// Deterministic transaction id: sha-256 over `(tx_hash, payload)`.
    #[must_use]
    pub fn derive_tx_id(tx_hash: &str, payload: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(tx_hash.as_bytes());
        hasher.update(payload);
        hex::encode(hasher.finalize())
    }

    fn validate(submission: &TransactionSubmission) -> StreamResult<()> {
        if submission.tx_hash.trim().is_empty() {
            return Err(StreamError::InvalidSubmission("empty tx hash".to_string()));
        }
        if submission.payload.is_empty() {
            return Err(StreamError::InvalidSubmission("empty payload".to_string()));
        }
        if submission.signer.trim().is_empty() {
            return Err(StreamError::InvalidSubmission("missing signer".to_string()));
        }
        Ok(())
    }

    fn view(record: &TransactionRecord) -> TransactionStatusView {
        TransactionStatusView {
            tx_id: record.tx_id.clone(),
            status: record.status,
            confirmations: record.confirmations,
            block_hash: record.block_height.map(|h| format!("0x{h:064x}")),
            finalized: record.status == TransactionStatus::Finalized,
            updated_at: rfc3339(record.submitted_at),
        }
    }

    fn receipt(record: &TransactionRecord) -> TransactionReceipt {
        TransactionReceipt {
            tx_id: record.tx_id.clone(),
            status: Self::view(record),
            block_height: record.block_height,
            gas_used: 0,
            timestamp: rfc3339(record.submitted_at),
            confirmation_count: record.confirmations,
        }
    }

    /// Advance a transaction through its lifecycle. Strictly forward;
    /// anything else is an invalid transition.
    pub fn advance_status(
        &self,
        tx_id: &str,
        status: TransactionStatus,
        confirmations: u32,
        block_height: Option<u64>,
    ) -> StreamResult<TransactionStatusView> {
        let view = {
            let mut records = self.records.write();
            let record = records
                .get_mut(tx_id)
                .ok_or_else(|| StreamError::UnknownTransaction(tx_id.to_string()))?;
            self.lifecycle.transition(record.status, status)?;
            record.status = status;
            record.confirmations = confirmations;
            if block_height.is_some() {
                record.block_height = block_height;
            }
            Self::view(record)
        };

        self.bus
            .publish(&Event::new(EventPayload::TransactionStatusChanged {
                tx_id: tx_id.to_string(),
                status,
                confirmations,
            }));
        Ok(view)
    }

    /// Live push of transaction events matching `filter`.
    #[must_use]
    pub fn subscribe_events(&self, filter: EventFilter) -> EventSubscription {
        self.subscriptions.subscribe(EventTopic::Transactions, filter)
    }
}

#[async_trait]
impl TransactionApi for TransactionService {
    fn submit_transaction(
        &self,
        submission: TransactionSubmission,
    ) -> StreamResult<TransactionReceipt> {
        Self::validate(&submission)?;
        let tx_id = Self::derive_tx_id(&submission.tx_hash, &submission.payload);

        {
            let records = self.records.read();
            if let Some(existing) = records.get(&tx_id) {
                debug!(tx_id = %tx_id, "Idempotent resubmission");
                return Ok(Self::receipt(existing));
            }
        }

        let tx_hash = submission.tx_hash.clone();
        let record = TransactionRecord {
            tx_id: tx_id.clone(),
            tx_hash: submission.tx_hash,
            signer: submission.signer,
            nonce: submission.nonce,
            status: TransactionStatus::Pending,
            confirmations: 0,
            block_height: None,
            submitted_at: unix_now_secs(),
        };
        let receipt = Self::receipt(&record);
        self.records.write().insert(tx_id.clone(), record);

        self.bus.publish(&Event::new(EventPayload::TransactionSubmitted {
            tx_id: tx_id.clone(),
            tx_hash,
            status: TransactionStatus::Pending,
        }));
        info!(tx_id = %tx_id, "Transaction submitted");
        Ok(receipt)
    }

    /// Point-in-time status of one transaction.
    fn get_transaction_status(&self, tx_id: &str) -> StreamResult<TransactionStatusView> {
        self.records
            .read()
            .get(tx_id)
            .map(Self::view)
            .ok_or_else(|| StreamError::UnknownTransaction(tx_id.to_string()))
    }

    /// Ingest a stream of submissions; reply once with a summary when
    /// the client closes its end.
    async fn batch_submit(
        &self,
        mut submissions: mpsc::Receiver<TransactionSubmission>,
    ) -> BatchSubmitSummary {
        let mut summary = BatchSubmitSummary::default();
        while let Some(submission) = submissions.recv().await {
            match self.submit_transaction(submission) {
                Ok(_) => summary.accepted += 1,
                Err(e) => {
                    summary.rejected += 1;
                    summary.errors.push(e.to_string());
                }
            }
        }
        summary
    }
}
