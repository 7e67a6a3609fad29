//! Prometheus metrics for Ledger Fabric subsystems.
//!
//! All metrics follow the naming convention: `lf_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., transfers_initiated_total)
//! - **Gauge**: Value that can go up or down (e.g., subscriptions_active)
//! - **Histogram**: Distribution of values (e.g., batch_optimize_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, GaugeVec, Histogram, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CONSENSUS METRICS
    // =========================================================================

    /// Current RAFT term per node
    pub static ref RAFT_CURRENT_TERM: GaugeVec = GaugeVec::new(
        Opts::new("lf_consensus_current_term", "Current RAFT term"),
        &["node"]
    ).expect("metric creation failed");

    /// Elections started, by outcome
    pub static ref RAFT_ELECTIONS: CounterVec = CounterVec::new(
        Opts::new("lf_consensus_elections_total", "RAFT elections"),
        &["outcome"]  // outcome: won/lost/stepped_down
    ).expect("metric creation failed");

    /// Role transitions, by new role
    pub static ref RAFT_ROLE_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("lf_consensus_role_transitions_total", "RAFT role transitions"),
        &["role"]  // role: follower/candidate/leader
    ).expect("metric creation failed");

    /// Log entries committed
    pub static ref RAFT_ENTRIES_COMMITTED: Counter = Counter::new(
        "lf_consensus_entries_committed_total",
        "Log entries committed across the cluster"
    ).expect("metric creation failed");

    /// Heartbeats sent by leaders
    pub static ref RAFT_HEARTBEATS_SENT: Counter = Counter::new(
        "lf_consensus_heartbeats_sent_total",
        "Empty AppendEntries heartbeats sent"
    ).expect("metric creation failed");

    // =========================================================================
    // BRIDGE METRICS
    // =========================================================================

    /// Transfers initiated
    pub static ref BRIDGE_TRANSFERS_INITIATED: Counter = Counter::new(
        "lf_bridge_transfers_initiated_total",
        "Cross-chain transfers initiated"
    ).expect("metric creation failed");

    /// Status transitions, by new status
    pub static ref BRIDGE_STATUS_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("lf_bridge_status_transitions_total", "Transfer status transitions"),
        &["status"]
    ).expect("metric creation failed");

    /// Oracle votes recorded, by outcome
    pub static ref BRIDGE_VOTES: CounterVec = CounterVec::new(
        Opts::new("lf_bridge_oracle_votes_total", "Oracle votes recorded"),
        &["outcome"]  // outcome: approved/rejected
    ).expect("metric creation failed");

    /// Voting rounds that reached supermajority
    pub static ref BRIDGE_CONSENSUS_REACHED: Counter = Counter::new(
        "lf_bridge_consensus_reached_total",
        "Voting rounds that reached the supermajority threshold"
    ).expect("metric creation failed");

    /// Lazy refunds applied
    pub static ref BRIDGE_REFUNDS: Counter = Counter::new(
        "lf_bridge_refunds_total",
        "Transfers refunded after timeout"
    ).expect("metric creation failed");

    // =========================================================================
    // ORDERING METRICS
    // =========================================================================

    /// Batches optimized
    pub static ref ORDERING_BATCHES: Counter = Counter::new(
        "lf_ordering_batches_optimized_total",
        "Transaction batches scored and reordered"
    ).expect("metric creation failed");

    /// Batch optimization duration
    pub static ref ORDERING_BATCH_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "lf_ordering_batch_optimize_duration_seconds",
            "Time spent scoring and reordering a batch"
        ).buckets(exponential_buckets(0.0001, 2.0, 12).expect("bucket creation failed"))
    ).expect("metric creation failed");

    /// Training points dropped because the buffer was full
    pub static ref TRAINING_POINTS_DROPPED: Counter = Counter::new(
        "lf_ordering_training_points_dropped_total",
        "Training data points dropped on a full buffer"
    ).expect("metric creation failed");

    /// Model update attempts, by outcome
    pub static ref MODEL_UPDATES: CounterVec = CounterVec::new(
        Opts::new("lf_ordering_model_updates_total", "Incremental model updates"),
        &["outcome"]  // outcome: installed/rejected/skipped
    ).expect("metric creation failed");

    /// Malformed training inputs skipped
    pub static ref MALFORMED_TRAINING_INPUTS: Counter = Counter::new(
        "lf_ordering_malformed_inputs_total",
        "Malformed training inputs counted and skipped"
    ).expect("metric creation failed");

    // =========================================================================
    // FAN-OUT METRICS
    // =========================================================================

    /// Events published to the observer bus
    pub static ref EVENTS_PUBLISHED: Counter = Counter::new(
        "lf_bus_events_published_total",
        "Events published to the observer bus"
    ).expect("metric creation failed");

    /// Events dropped on overflow, by queue
    pub static ref EVENTS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("lf_bus_events_dropped_total", "Events dropped on full queues"),
        &["queue"]
    ).expect("metric creation failed");

    /// Active subscriptions, by service
    pub static ref SUBSCRIPTIONS_ACTIVE: GaugeVec = GaugeVec::new(
        Opts::new("lf_streaming_subscriptions_active", "Active subscriptions"),
        &["service"]
    ).expect("metric creation failed");

    /// Subscriptions evicted, by reason
    pub static ref SUBSCRIPTIONS_EVICTED: CounterVec = CounterVec::new(
        Opts::new("lf_streaming_subscriptions_evicted_total", "Subscriptions evicted"),
        &["reason"]  // reason: sink_error/cancelled/idle
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// RPC-boundary errors, by taxonomy kind
    pub static ref RPC_ERRORS: CounterVec = CounterVec::new(
        Opts::new("lf_rpc_errors_total", "RPC errors by kind"),
        &["kind"]
    ).expect("metric creation failed");
}

/// Handle for the metrics registry
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Consensus
        Box::new(RAFT_CURRENT_TERM.clone()),
        Box::new(RAFT_ELECTIONS.clone()),
        Box::new(RAFT_ROLE_TRANSITIONS.clone()),
        Box::new(RAFT_ENTRIES_COMMITTED.clone()),
        Box::new(RAFT_HEARTBEATS_SENT.clone()),
        // Bridge
        Box::new(BRIDGE_TRANSFERS_INITIATED.clone()),
        Box::new(BRIDGE_STATUS_TRANSITIONS.clone()),
        Box::new(BRIDGE_VOTES.clone()),
        Box::new(BRIDGE_CONSENSUS_REACHED.clone()),
        Box::new(BRIDGE_REFUNDS.clone()),
        // Ordering
        Box::new(ORDERING_BATCHES.clone()),
        Box::new(ORDERING_BATCH_DURATION.clone()),
        Box::new(TRAINING_POINTS_DROPPED.clone()),
        Box::new(MODEL_UPDATES.clone()),
        Box::new(MALFORMED_TRAINING_INPUTS.clone()),
        // Fan-out
        Box::new(EVENTS_PUBLISHED.clone()),
        Box::new(EVENTS_DROPPED.clone()),
        Box::new(SUBSCRIPTIONS_ACTIVE.clone()),
        Box::new(SUBSCRIPTIONS_EVICTED.clone()),
        // Errors
        Box::new(RPC_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
///
/// This is the consistent point-in-time snapshot view; no cross-metric
/// atomicity is promised.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
