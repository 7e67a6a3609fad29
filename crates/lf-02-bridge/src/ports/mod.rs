//! Ports for bridge coordination.

pub mod inbound;
pub mod outbound;

pub use inbound::BridgeApi;
pub use outbound::{AcceptAllProofs, ProofVerifier, SystemTimeSource, TimeSource};
