//! # Subsystem Wiring
//!
//! Builds every subsystem as a constructed value with explicit
//! collaborators. There is no global lookup: the bus, repositories, and
//! services are created here and handed to their consumers.

use anyhow::{anyhow, Result};
use lf_01_consensus::{InMemoryCluster, InMemoryStateStore, RaftConfig, RaftNode};
use lf_02_bridge::{AcceptAllProofs, BridgeConfig, BridgeCoordinator, BridgeTransfer, SystemTimeSource};
use lf_03_tx_ordering::{OrderingConfig, OrderingService};
use lf_04_streaming::{StreamingConfig, TransactionService, ValidatorService};
use shared_bus::ObserverBus;
use shared_types::{FabricConfig, InMemoryRepository, Repository};
use std::sync::Arc;
use tracing::info;

/// A fully wired fabric node.
pub struct FabricNode {
    /// The observer bus every subsystem publishes on.
    pub bus: Arc<ObserverBus>,
    /// RAFT consensus engine.
    pub consensus: Arc<RaftNode>,
    /// Bridge oracle coordinator.
    pub bridge: Arc<BridgeCoordinator>,
    /// Score-driven transaction ordering.
    pub ordering: Arc<OrderingService>,
    /// Transaction streaming service.
    pub transactions: Arc<TransactionService>,
    /// Validator streaming service.
    pub validators: Arc<ValidatorService>,
    consensus_driver: tokio::task::JoinHandle<()>,
}

impl FabricNode {
    /// Stop background workers.
    pub fn shutdown(&self) {
        self.consensus.shutdown();
        self.consensus_driver.abort();
    }
}

/// Construct all subsystems from one configuration record.
pub async fn build_node(node_id: &str, config: FabricConfig) -> Result<FabricNode> {
    config.validate().map_err(|e| anyhow!(e))?;

    let bus = Arc::new(ObserverBus::new());

    // Consensus: a single-node cluster by default; peers join through
    // membership changes in the log.
    let cluster = InMemoryCluster::new();
    let consensus = RaftNode::new(
        RaftConfig::from_fabric(node_id, vec![node_id.to_string()], &config),
        cluster.handle(node_id),
        Arc::new(InMemoryStateStore::new()),
        Arc::clone(&bus),
    )
    .await?;
    cluster.register(consensus.clone());
    let consensus_driver = consensus.spawn_timers();

    let bridge_repository: Arc<dyn Repository<BridgeTransfer>> =
        Arc::new(InMemoryRepository::new());
    let bridge = Arc::new(BridgeCoordinator::new(
        BridgeConfig::from_fabric(&config),
        bridge_repository,
        Arc::new(AcceptAllProofs),
        Arc::new(SystemTimeSource),
        Arc::clone(&bus),
    ));

    let ordering = Arc::new(OrderingService::new(
        OrderingConfig::from_fabric(&config),
        Arc::clone(&bus),
    ));

    let streaming_config = StreamingConfig::from_fabric(&config);
    let transactions = Arc::new(TransactionService::new(
        streaming_config.clone(),
        Arc::clone(&bus),
    ));
    let validators = Arc::new(ValidatorService::new(streaming_config, Arc::clone(&bus)));

    info!(node_id, "Fabric node wired");
    Ok(FabricNode {
        bus,
        consensus,
        bridge,
        ordering,
        transactions,
        validators,
        consensus_driver,
    })
}

/// Load configuration from the environment over the defaults.
///
/// Recognized keys: `LF_ELECTION_TIMEOUT_LOW_MS`, `LF_ELECTION_TIMEOUT_HIGH_MS`,
/// `LF_HEARTBEAT_INTERVAL_MS`, `LF_WORKER_POOL_SIZE`,
/// `LF_SUBSCRIPTION_QUEUE_CAPACITY`, `LF_TRAINING_BUFFER_CAPACITY`,
/// `LF_MODEL_UPDATE_INTERVAL_BLOCKS`, `LF_ACCEPT_ACCURACY_THRESHOLD`,
/// `LF_BRIDGE_DEFAULT_TIMEOUT_SECONDS`.
#[must_use]
pub fn config_from_env() -> FabricConfig {
    fn parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
        std::env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(fallback)
    }

    let defaults = FabricConfig::default();
    FabricConfig {
        election_timeout_ms_range: (
            parse("LF_ELECTION_TIMEOUT_LOW_MS", defaults.election_timeout_ms_range.0),
            parse("LF_ELECTION_TIMEOUT_HIGH_MS", defaults.election_timeout_ms_range.1),
        ),
        heartbeat_interval_ms: parse("LF_HEARTBEAT_INTERVAL_MS", defaults.heartbeat_interval_ms),
        worker_pool_size: parse("LF_WORKER_POOL_SIZE", defaults.worker_pool_size),
        subscription_queue_capacity: parse(
            "LF_SUBSCRIPTION_QUEUE_CAPACITY",
            defaults.subscription_queue_capacity,
        ),
        training_buffer_capacity: parse(
            "LF_TRAINING_BUFFER_CAPACITY",
            defaults.training_buffer_capacity,
        ),
        model_update_interval_blocks: parse(
            "LF_MODEL_UPDATE_INTERVAL_BLOCKS",
            defaults.model_update_interval_blocks,
        ),
        accept_accuracy_threshold: parse(
            "LF_ACCEPT_ACCURACY_THRESHOLD",
            defaults.accept_accuracy_threshold,
        ),
        bridge_default_timeout_seconds: parse(
            "LF_BRIDGE_DEFAULT_TIMEOUT_SECONDS",
            defaults.bridge_default_timeout_seconds,
        ),
        confidence_variance_divisor: defaults.confidence_variance_divisor,
    }
}
