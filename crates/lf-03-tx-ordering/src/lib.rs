//! # LF-03 Transaction Ordering - Scoring & Online Learning
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Orders transaction batches by a pure weighted score and keeps the
//! scoring model fresh through an interval-gated online learning loop
//! that never blocks request threads.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Score is pure over the profile | `algorithms/scoring.rs` |
//! | INVARIANT-2 | Confidence in `[0.5, 1.0]` | `scoring.rs` - `confidence()` clamp |
//! | INVARIANT-3 | Learning rate in `[0.001, 0.1]`, ≤5% step | `application/learner.rs` |
//! | INVARIANT-4 | Version grows by exactly one per install | `learner.rs` - `run_update()` |
//! | INVARIANT-5 | Full buffer drops newest, counted | `application/service.rs` |
//!
//! ## Concurrency Model
//!
//! Batch optimization runs inline on the request path. Model updates run
//! on a semaphore-bounded worker pool; malformed feedback entries are
//! counted and skipped without aborting the batch.

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-export main types
pub use algorithms::{confidence, order_batch, score};
pub use application::{OnlineLearner, OrderingService};
pub use config::OrderingConfig;
pub use domain::{
    CompletedTx, ModelSnapshot, OptimizedBatch, OrderingError, OrderingResult, ScoredTransaction,
    TrainingDataPoint, TransactionProfile,
};
pub use ports::OrderingApi;
