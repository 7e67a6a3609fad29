//! # Fabric Configuration
//!
//! The single configuration record collaborators hand to the runtime.
//! Every subsystem pulls the fields it recognizes; defaults are safe for
//! a single-node development fabric.

use serde::{Deserialize, Serialize};

/// Configuration for the whole fabric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FabricConfig {
    /// Randomized election timeout range in milliseconds `(low, high)`.
    pub election_timeout_ms_range: (u64, u64),
    /// Leader heartbeat interval in milliseconds. Must stay strictly below
    /// the election timeout lower bound.
    pub heartbeat_interval_ms: u64,
    /// Size of the ingress worker pool.
    pub worker_pool_size: usize,
    /// Per-subscription bounded queue capacity.
    pub subscription_queue_capacity: usize,
    /// Capacity of the training-data buffer.
    pub training_buffer_capacity: usize,
    /// Model update cadence: update only when `block_number` is a multiple
    /// of this interval.
    pub model_update_interval_blocks: u64,
    /// Minimum accuracy for installing a new model snapshot.
    pub accept_accuracy_threshold: f64,
    /// Default transfer timeout in seconds when a request omits one.
    pub bridge_default_timeout_seconds: u64,
    /// Divisor applied to score variance when deriving batch confidence.
    pub confidence_variance_divisor: f64,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            election_timeout_ms_range: (150, 300),
            heartbeat_interval_ms: 50,
            worker_pool_size: 50,
            subscription_queue_capacity: 10_000,
            training_buffer_capacity: 100_000,
            model_update_interval_blocks: 1_000,
            accept_accuracy_threshold: 0.9,
            bridge_default_timeout_seconds: 3_600,
            confidence_variance_divisor: 1_000.0,
        }
    }
}

impl FabricConfig {
    /// Validate internal consistency of the record.
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        let (low, high) = self.election_timeout_ms_range;
        if low == 0 || low >= high {
            return Err(format!("election timeout range must be 0 < low < high, got ({low}, {high})"));
        }
        if self.heartbeat_interval_ms >= low {
            return Err(format!(
                "heartbeat interval {}ms must be below election timeout lower bound {low}ms",
                self.heartbeat_interval_ms
            ));
        }
        if self.worker_pool_size == 0 {
            return Err("worker pool size must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.accept_accuracy_threshold) {
            return Err(format!(
                "accept accuracy threshold must be in [0, 1], got {}",
                self.accept_accuracy_threshold
            ));
        }
        if self.confidence_variance_divisor <= 0.0 {
            return Err("confidence variance divisor must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FabricConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = FabricConfig::default();
        assert_eq!(config.election_timeout_ms_range, (150, 300));
        assert_eq!(config.heartbeat_interval_ms, 50);
        assert_eq!(config.worker_pool_size, 50);
        assert_eq!(config.training_buffer_capacity, 100_000);
        assert_eq!(config.model_update_interval_blocks, 1_000);
        assert!((config.accept_accuracy_threshold - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_heartbeat_must_undercut_election_timeout() {
        let config = FabricConfig {
            heartbeat_interval_ms: 200,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_timeout_range_rejected() {
        let config = FabricConfig {
            election_timeout_ms_range: (300, 150),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
