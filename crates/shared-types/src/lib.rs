//! # Shared Types Crate
//!
//! This crate contains the domain entities, wire-boundary enums, the error
//! taxonomy, the fabric configuration record, the generic versioned state
//! machine, and the repository port shared across all subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Explicit Collaborators**: Subsystems receive constructed values; there
//!   is no global lookup beyond the metrics registry.
//! - **Bit-Exact Wire Enums**: `BridgeStatus` and `TransactionStatus` carry
//!   their wire discriminants so boundary encodings never drift.

pub mod config;
pub mod entities;
pub mod errors;
pub mod repository;
pub mod state_machine;

pub use config::FabricConfig;
pub use entities::*;
pub use errors::{ErrorKind, RpcError};
pub use repository::{InMemoryRepository, Repository, RepositoryError, Storable};
pub use state_machine::{InvalidTransition, StateMachine, StateMachineBuilder, TrackedState};
