//! # Scoring
//!
//! The pure scoring function and the batch statistics derived from it.
//!
//! ```text
//! score(tx) = 0.5 * priority_score + 0.3 * gas_score + 0.2 * dependency_score
//!   priority_score   = priority * 10
//!   gas_score        = min(gas_price / 100, 50)
//!   dependency_score = 20 if no dependencies else 5
//! ```
//!
//! Ordering is a stable sort descending by score, so equal-score
//! transactions keep their submission order.

use crate::domain::{ScoredTransaction, TransactionProfile};

const PRIORITY_WEIGHT: f64 = 0.5;
const GAS_WEIGHT: f64 = 0.3;
const DEPENDENCY_WEIGHT: f64 = 0.2;
const GAS_SCORE_CAP: f64 = 50.0;

/// Score one transaction. Pure.
#[must_use]
pub fn score(profile: &TransactionProfile) -> f64 {
    let priority_score = f64::from(profile.priority) * 10.0;
    let gas_score = (profile.gas_price as f64 / 100.0).min(GAS_SCORE_CAP);
    let dependency_score = if profile.dependencies.is_empty() {
        20.0
    } else {
        5.0
    };

    PRIORITY_WEIGHT * priority_score + GAS_WEIGHT * gas_score + DEPENDENCY_WEIGHT * dependency_score
}

/// Score a batch and order it best-first (stable).
#[must_use]
pub fn order_batch(profiles: Vec<TransactionProfile>) -> Vec<ScoredTransaction> {
    let mut scored: Vec<ScoredTransaction> = profiles
        .into_iter()
        .map(|profile| ScoredTransaction {
            score: score(&profile),
            profile,
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

/// Mean score of an ordered batch. Zero for an empty batch.
#[must_use]
pub fn average_score(scored: &[ScoredTransaction]) -> f64 {
    if scored.is_empty() {
        return 0.0;
    }
    scored.iter().map(|s| s.score).sum::<f64>() / scored.len() as f64
}

/// Population variance of the scores.
#[must_use]
pub fn score_variance(scored: &[ScoredTransaction]) -> f64 {
    if scored.is_empty() {
        return 0.0;
    }
    let mean = average_score(scored);
    scored
        .iter()
        .map(|s| {
            let d = s.score - mean;
            d * d
        })
        .sum::<f64>()
        / scored.len() as f64
}

/// Confidence in the ordering: `clamp(1 - variance / divisor, 0.5, 1.0)`.
#[must_use]
pub fn confidence(scored: &[ScoredTransaction], variance_divisor: f64) -> f64 {
    (1.0 - score_variance(scored) / variance_divisor).clamp(0.5, 1.0)
}
