//! # LF-02 Bridge - Byzantine-Quorum Oracle Coordination
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Coordinates atomic cross-chain transfers whose validity is attested by
//! an oracle committee: per-transfer voting rounds, supermajority
//! detection, monotonic status progression, and timeout-driven refunds.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Supermajority `⌊2n/3⌋+1` | `domain/entities.rs` - `supermajority()` |
//! | INVARIANT-2 | One current vote per oracle | `OracleVotingRound::record_vote()` overwrites |
//! | INVARIANT-3 | No status regression | `domain/mod.rs` - `status_machine()` table |
//! | INVARIANT-4 | Terminal states are final | transition table has no exits |
//! | INVARIANT-5 | Refund requires expiry, never `Settled` | `service/mod.rs` - `maybe_refund()` |
//!
//! ## Failure Semantics
//!
//! - One crashed oracle never blocks a round the remaining supermajority
//!   can still complete.
//! - Votes for unknown transfers or from outside the committee are
//!   logged and ignored; they never error a stream.
//! - Only a persist failure fails `initiate_transfer`; vote recording is
//!   never failed by the store.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use lf_02_bridge::{BridgeApi, BridgeConfig, BridgeCoordinator};
//!
//! let coordinator = BridgeCoordinator::new(config, repository, verifier, time, bus);
//! let update = coordinator.initiate_transfer(request).await?;
//! let result = coordinator.submit_vote("b-1", "oracle-a", true, "proof ok").await;
//! ```

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types
pub use config::BridgeConfig;
pub use domain::{
    status_machine, supermajority, BatchSummary, BridgeError, BridgeResult, BridgeStatusUpdate,
    BridgeTransfer, BridgeTransferRequest, OracleVote, OracleVoteMessage, OracleVotingRound,
    PendingTransferNotice, VerificationResult,
};
pub use ports::{AcceptAllProofs, BridgeApi, ProofVerifier, SystemTimeSource, TimeSource};
pub use service::{BridgeCoordinator, StatusMonitor};
