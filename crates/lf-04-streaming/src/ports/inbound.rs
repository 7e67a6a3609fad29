//! Inbound Ports (Driving Ports / API)

use crate::domain::{
    BatchSubmitSummary, StreamResult, TransactionReceipt, TransactionStatusView,
    TransactionSubmission,
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Primary transaction ingest API.
#[async_trait]
pub trait TransactionApi: Send + Sync {
    /// Submit one transaction. Resubmitting the same `(tx_hash, payload)`
    /// yields the same transaction id.
    fn submit_transaction(
        &self,
        submission: TransactionSubmission,
    ) -> StreamResult<TransactionReceipt>;

    /// Point-in-time status of one transaction.
    fn get_transaction_status(&self, tx_id: &str) -> StreamResult<TransactionStatusView>;

    /// Ingest a stream of submissions; reply once with a summary when
    /// the client closes its end.
    async fn batch_submit(
        &self,
        submissions: mpsc::Receiver<TransactionSubmission>,
    ) -> BatchSubmitSummary;
}
