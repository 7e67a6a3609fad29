//! Streaming subsystem configuration.

use shared_types::FabricConfig;

/// Configuration for subscription-backed streaming services.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Per-subscription bounded queue capacity.
    pub queue_capacity: usize,
    /// Evict a subscriber that has not read for this long, seconds.
    pub idle_timeout_secs: u64,
    /// Tick interval used when a subscription requests none.
    pub default_update_interval_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
            idle_timeout_secs: 300,
            default_update_interval_ms: 1_000,
        }
    }
}

impl StreamingConfig {
    /// Derive from the fabric-wide record.
    #[must_use]
    pub fn from_fabric(fabric: &FabricConfig) -> Self {
        Self {
            queue_capacity: fabric.subscription_queue_capacity,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamingConfig::default();
        assert_eq!(config.queue_capacity, 10_000);
        assert_eq!(config.idle_timeout_secs, 300);
    }

    #[test]
    fn test_from_fabric() {
        let fabric = FabricConfig {
            subscription_queue_capacity: 42,
            ..Default::default()
        };
        assert_eq!(StreamingConfig::from_fabric(&fabric).queue_capacity, 42);
    }
}
