//! Ports for the streaming services.

pub mod inbound;

pub use inbound::TransactionApi;
