//! Pure ordering algorithms.

pub mod scoring;

pub use scoring::{average_score, confidence, order_batch, score, score_variance};
