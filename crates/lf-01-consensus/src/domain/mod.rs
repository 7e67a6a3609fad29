//! Domain layer for the consensus engine.

pub mod entities;
pub mod errors;
pub mod messages;

pub use entities::{EntryPayload, HardState, LogEntry, RaftStatus};
pub use errors::{ConsensusError, ConsensusResult};
pub use messages::{
    AppendEntriesRequest, AppendEntriesResponse, ProposeReceipt, RequestVoteRequest,
    RequestVoteResponse,
};
