//! # Node Runtime Library
//!
//! Exposes the wiring module for integration tests; the binary entry
//! point lives in `main.rs`.

pub mod wiring;

pub use wiring::{build_node, config_from_env, FabricNode};
