//! # LF-04 Streaming - Subscription Lifecycle & Fan-out Services
//!
//! **Subsystem ID:** 4
//!
//! ## Purpose
//!
//! The streaming face of the fabric: per-subscriber bounded queues over
//! the observer bus, periodic-update tickers, idle eviction, and the
//! transaction/validator service surfaces built on them.
//!
//! ## Call Patterns
//!
//! | Pattern | Example |
//! |---------|---------|
//! | Unary query | `TransactionService::get_transaction_status` |
//! | Client stream | `TransactionService::batch_submit` |
//! | Server stream | `TransactionService::subscribe_events`, `ValidatorService::subscribe` |
//! | Bidirectional | `shared_bus::duplex` sessions (see the bridge verification stream) |
//!
//! ## Backpressure
//!
//! Every server stream drains a bounded queue. Overflow drops the newest
//! event and bumps a counter; a subscriber is never torn down for
//! overflow alone. Teardown happens on consumer departure, explicit
//! cancel, or idle timeout.

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod subscription;

// Re-export main types
pub use config::StreamingConfig;
pub use domain::{
    BatchSubmitSummary, StreamError, StreamResult, TransactionReceipt, TransactionRecord,
    TransactionStatusView, TransactionSubmission, ValidatorInfo, ValidatorSubscriptionRequest,
};
pub use ports::TransactionApi;
pub use service::{TransactionService, ValidatorService, ValidatorSubscription};
pub use subscription::{EventSubscription, SubscriptionManager};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        assert_eq!(StreamingConfig::default().queue_capacity, 10_000);
    }
}
