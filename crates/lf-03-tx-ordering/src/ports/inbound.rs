//! Inbound Ports (Driving Ports / API)

use crate::domain::{OptimizedBatch, OrderingResult, TransactionProfile};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Primary transaction ordering API.
#[async_trait]
pub trait OrderingApi: Send + Sync {
    /// Collect the client stream until it closes, score and reorder the
    /// batch, and reply once with the optimized order and its summary
    /// statistics.
    async fn optimize_transaction_order(
        &self,
        requests: mpsc::Receiver<TransactionProfile>,
    ) -> OrderingResult<OptimizedBatch>;
}
