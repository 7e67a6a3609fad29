//! Domain layer for bridge coordination.

pub mod entities;
pub mod errors;

pub use entities::{
    supermajority, BatchSummary, BridgeStatusUpdate, BridgeTransfer, BridgeTransferRequest,
    OracleVote, OracleVoteMessage, OracleVotingRound, PendingTransferNotice, UnknownOracle,
    VerificationResult,
};
pub use errors::{BridgeError, BridgeResult};

use shared_types::{BridgeStatus, StateMachine};

/// The transfer status transition table.
///
/// ```text
/// Pending ──consensus──▶ Relayed ──callback quorum──▶ Executed ──confirmation──▶ Settled
///    │                      │                            │
///    └──────────────────────┴────── timeout ─────────────┴──▶ Refunded
/// ```
///
/// `Failed` is reachable from every non-terminal state. Terminal states
/// (`Settled`, `Refunded`, `Failed`) admit nothing.
#[must_use]
pub fn status_machine() -> StateMachine<BridgeStatus> {
    StateMachine::builder()
        .allow(
            BridgeStatus::Pending,
            [
                BridgeStatus::Relayed,
                BridgeStatus::Refunded,
                BridgeStatus::Failed,
            ],
        )
        .allow(
            BridgeStatus::Relayed,
            [
                BridgeStatus::Executed,
                BridgeStatus::Refunded,
                BridgeStatus::Failed,
            ],
        )
        .allow(
            BridgeStatus::Executed,
            [
                BridgeStatus::Settled,
                BridgeStatus::Refunded,
                BridgeStatus::Failed,
            ],
        )
        .build()
}
