//! Bridge coordinator configuration.

use shared_types::FabricConfig;

/// Configuration for the bridge coordinator.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Timeout applied when a request carries none.
    pub default_timeout_seconds: u64,
    /// Capacity of the pending-transfer queue.
    pub pending_queue_capacity: usize,
    /// Capacity of per-monitor push queues.
    pub monitor_queue_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: 3_600,
            pending_queue_capacity: 10_000,
            monitor_queue_capacity: 10_000,
        }
    }
}

impl BridgeConfig {
    /// Derive from the fabric-wide record.
    #[must_use]
    pub fn from_fabric(fabric: &FabricConfig) -> Self {
        Self {
            default_timeout_seconds: fabric.bridge_default_timeout_seconds,
            pending_queue_capacity: fabric.subscription_queue_capacity,
            monitor_queue_capacity: fabric.subscription_queue_capacity,
        }
    }
}
