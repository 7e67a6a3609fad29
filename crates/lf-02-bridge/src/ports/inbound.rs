//! Inbound Ports (Driving Ports / API)

use crate::domain::{BridgeResult, BridgeStatusUpdate, BridgeTransferRequest, VerificationResult};
use async_trait::async_trait;

/// Primary bridge coordination API (unary surface).
///
/// The stream-shaped operations (verification, pending-transfer stream,
/// batch ingest, status monitoring) live on the coordinator itself since
/// they hand out queue ends rather than plain futures.
#[async_trait]
pub trait BridgeApi: Send + Sync {
    /// Create a transfer and open its voting round. Fails with a
    /// duplicate-id error if `bridge_id` exists; fails unavailable when
    /// the transfer cannot be persisted.
    async fn initiate_transfer(
        &self,
        req: BridgeTransferRequest,
    ) -> BridgeResult<BridgeStatusUpdate>;

    /// Record one oracle vote. Returns the verification result if this
    /// vote is the one that reached supermajority; unknown transfer ids
    /// are logged and ignored.
    async fn submit_vote(
        &self,
        bridge_id: &str,
        oracle_address: &str,
        approved: bool,
        reason: &str,
    ) -> Option<VerificationResult>;

    /// Record a destination-side execution confirmation; transitions to
    /// `Executed` once a quorum of callbacks arrived.
    async fn execute_bridge_callback(
        &self,
        bridge_id: &str,
        oracle_address: &str,
        dest_tx_hash: &str,
    ) -> BridgeResult<BridgeStatusUpdate>;

    /// Current status. Applies the lazy timeout refund before answering.
    async fn get_transfer_status(&self, bridge_id: &str) -> BridgeResult<BridgeStatusUpdate>;
}
