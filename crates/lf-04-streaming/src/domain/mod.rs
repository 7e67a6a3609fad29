//! Domain layer for the streaming services.

pub mod entities;
pub mod errors;

pub use entities::{
    BatchSubmitSummary, TransactionReceipt, TransactionRecord, TransactionStatusView,
    TransactionSubmission, ValidatorInfo, ValidatorSubscriptionRequest,
};
pub use errors::{StreamError, StreamResult};
