//! Streaming services.

pub mod transactions;
pub mod validators;

pub use transactions::TransactionService;
pub use validators::{ValidatorService, ValidatorSubscription};
