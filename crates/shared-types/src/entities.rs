//! # Core Domain Entities
//!
//! Wire-boundary enums and small shared value types used by every
//! subsystem.
//!
//! ## Clusters
//!
//! - **Bridge**: `BridgeStatus`, `ChainId`
//! - **Transactions**: `TransactionStatus`
//! - **Consensus**: `NodeRole`
//! - **Time**: unix/RFC3339 helpers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// CLUSTER A: BRIDGE
// =============================================================================

/// Status of a cross-chain bridge transfer.
///
/// Discriminants are wire values and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum BridgeStatus {
    /// Status not known (wire default).
    Unknown = 0,
    /// Transfer recorded, waiting for oracle consensus.
    Pending = 1,
    /// Oracle supermajority approved; message relayed to destination.
    Relayed = 2,
    /// Destination callback executed with quorum confirmation.
    Executed = 3,
    /// Destination confirmed; transfer is final.
    Settled = 4,
    /// Timed out before settlement; funds returned.
    Refunded = 5,
    /// Unrecoverable error.
    Failed = 6,
}

impl BridgeStatus {
    /// Terminal statuses admit no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Refunded | Self::Failed)
    }

    /// Wire discriminant for boundary encodings.
    #[must_use]
    pub fn wire_value(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "UNKNOWN",
            Self::Pending => "PENDING",
            Self::Relayed => "RELAYED",
            Self::Executed => "EXECUTED",
            Self::Settled => "SETTLED",
            Self::Refunded => "REFUNDED",
            Self::Failed => "FAILED",
        };
        write!(f, "{name}")
    }
}

/// Chains a transfer can originate from or settle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    /// The fabric's own ledger.
    Fabric,
    Ethereum,
    Bitcoin,
    Polygon,
    Arbitrum,
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fabric => "fabric",
            Self::Ethereum => "ethereum",
            Self::Bitcoin => "bitcoin",
            Self::Polygon => "polygon",
            Self::Arbitrum => "arbitrum",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// CLUSTER B: TRANSACTIONS
// =============================================================================

/// Lifecycle status of a submitted transaction.
///
/// Discriminants are wire values and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TransactionStatus {
    /// Status not known (wire default).
    Unknown = 0,
    /// Accepted into the pending set.
    Pending = 1,
    /// Passed structural validation.
    Validated = 2,
    /// Included in a block.
    Included = 3,
    /// Confirmed by at least one descendant block.
    Confirmed = 4,
    /// Irreversible.
    Finalized = 5,
}

impl TransactionStatus {
    /// Wire discriminant for boundary encodings.
    #[must_use]
    pub fn wire_value(self) -> i32 {
        self as i32
    }
}

// =============================================================================
// CLUSTER C: CONSENSUS
// =============================================================================

/// Role of a consensus node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Passive replica; the initial role.
    Follower,
    /// Election in progress, soliciting votes.
    Candidate,
    /// Elected for the current term; drives replication.
    Leader,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Follower => "FOLLOWER",
            Self::Candidate => "CANDIDATE",
            Self::Leader => "LEADER",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// CLUSTER D: TIME
// =============================================================================

/// Current unix time in whole seconds.
#[must_use]
pub fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Current unix time in milliseconds.
#[must_use]
pub fn unix_now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Render a unix-seconds timestamp as an RFC3339 string for the wire.
#[must_use]
pub fn rfc3339(unix_secs: u64) -> String {
    chrono::DateTime::from_timestamp(unix_secs as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "1970-01-01T00:00:00+00:00".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_status_wire_values() {
        assert_eq!(BridgeStatus::Unknown.wire_value(), 0);
        assert_eq!(BridgeStatus::Pending.wire_value(), 1);
        assert_eq!(BridgeStatus::Relayed.wire_value(), 2);
        assert_eq!(BridgeStatus::Executed.wire_value(), 3);
        assert_eq!(BridgeStatus::Settled.wire_value(), 4);
        assert_eq!(BridgeStatus::Refunded.wire_value(), 5);
        assert_eq!(BridgeStatus::Failed.wire_value(), 6);
    }

    #[test]
    fn test_transaction_status_wire_values() {
        assert_eq!(TransactionStatus::Unknown.wire_value(), 0);
        assert_eq!(TransactionStatus::Pending.wire_value(), 1);
        assert_eq!(TransactionStatus::Validated.wire_value(), 2);
        assert_eq!(TransactionStatus::Included.wire_value(), 3);
        assert_eq!(TransactionStatus::Confirmed.wire_value(), 4);
        assert_eq!(TransactionStatus::Finalized.wire_value(), 5);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(BridgeStatus::Settled.is_terminal());
        assert!(BridgeStatus::Refunded.is_terminal());
        assert!(BridgeStatus::Failed.is_terminal());
        assert!(!BridgeStatus::Pending.is_terminal());
        assert!(!BridgeStatus::Relayed.is_terminal());
        assert!(!BridgeStatus::Executed.is_terminal());
    }

    #[test]
    fn test_rfc3339_epoch() {
        assert_eq!(rfc3339(0), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_unix_now_monotonic_enough() {
        let a = unix_now_millis();
        let b = unix_now_millis();
        assert!(b >= a);
    }
}
