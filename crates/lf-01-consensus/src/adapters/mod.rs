//! Adapters for the consensus engine.

pub mod in_memory;

pub use in_memory::{ClusterHandle, InMemoryCluster, InMemoryStateStore};
