//! Ordering subsystem configuration.

use shared_types::FabricConfig;

/// Configuration for ordering and the online learner.
#[derive(Debug, Clone)]
pub struct OrderingConfig {
    /// Divisor applied to score variance when deriving confidence.
    pub confidence_variance_divisor: f64,
    /// Capacity of the training-data buffer.
    pub training_buffer_capacity: usize,
    /// Update only when `block_number` is a multiple of this.
    pub model_update_interval_blocks: u64,
    /// Minimum accuracy for installing a new snapshot.
    pub accept_accuracy_threshold: f64,
    /// Concurrent model-update workers.
    pub worker_pool_size: usize,
    /// Starting learning rate; adapted within `[0.001, 0.1]` by at most
    /// 5% per update.
    pub initial_learning_rate: f64,
    /// Training points drained per update run.
    pub drain_batch_limit: usize,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            confidence_variance_divisor: 1_000.0,
            training_buffer_capacity: 100_000,
            model_update_interval_blocks: 1_000,
            accept_accuracy_threshold: 0.9,
            worker_pool_size: 4,
            initial_learning_rate: 0.01,
            drain_batch_limit: 1_024,
        }
    }
}

impl OrderingConfig {
    /// Derive from the fabric-wide record.
    #[must_use]
    pub fn from_fabric(fabric: &FabricConfig) -> Self {
        Self {
            confidence_variance_divisor: fabric.confidence_variance_divisor,
            training_buffer_capacity: fabric.training_buffer_capacity,
            model_update_interval_blocks: fabric.model_update_interval_blocks,
            accept_accuracy_threshold: fabric.accept_accuracy_threshold,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrderingConfig::default();
        assert_eq!(config.training_buffer_capacity, 100_000);
        assert_eq!(config.model_update_interval_blocks, 1_000);
        assert!((config.accept_accuracy_threshold - 0.9).abs() < f64::EPSILON);
        assert!((config.confidence_variance_divisor - 1_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_fabric() {
        let fabric = FabricConfig {
            training_buffer_capacity: 64,
            model_update_interval_blocks: 10,
            accept_accuracy_threshold: 0.5,
            confidence_variance_divisor: 250.0,
            ..Default::default()
        };
        let config = OrderingConfig::from_fabric(&fabric);
        assert_eq!(config.training_buffer_capacity, 64);
        assert_eq!(config.model_update_interval_blocks, 10);
        assert!((config.confidence_variance_divisor - 250.0).abs() < f64::EPSILON);
    }
}
