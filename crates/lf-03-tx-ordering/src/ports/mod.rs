//! Ports for transaction ordering.

pub mod inbound;

pub use inbound::OrderingApi;
