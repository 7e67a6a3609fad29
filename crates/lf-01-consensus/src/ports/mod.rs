//! Ports for the consensus engine.

pub mod inbound;
pub mod outbound;

pub use inbound::ConsensusApi;
pub use outbound::{RaftStateStore, RaftTransport, StoreError, TransportError};
