//! Ordering Service
//!
//! Main service implementing `OrderingApi`: collect a batch from the
//! client stream, score and reorder it, reply once, and record a
//! training observation without blocking the reply path.

use crate::algorithms::{average_score, confidence, order_batch};
use crate::application::learner::OnlineLearner;
use crate::config::OrderingConfig;
use crate::domain::{
    CompletedTx, ModelSnapshot, OptimizedBatch, OrderingError, OrderingResult, TrainingDataPoint,
    TransactionProfile,
};
use crate::ports::inbound::OrderingApi;
use async_trait::async_trait;
use fabric_telemetry::metrics::{ORDERING_BATCHES, ORDERING_BATCH_DURATION, TRAINING_POINTS_DROPPED};
use fabric_telemetry::time_histogram;
use shared_bus::{BoundedEventQueue, Event, EventPayload, ObserverBus};
use shared_types::unix_now_millis;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Score-driven transaction ordering with an online learning loop.
pub struct OrderingService {
    config: OrderingConfig,
    training_buffer: Arc<BoundedEventQueue<TrainingDataPoint>>,
    learner: Arc<OnlineLearner>,
    bus: Arc<ObserverBus>,
}

impl OrderingService {
    /// Create a service with its own learner.
    #[must_use]
    pub fn new(config: OrderingConfig, bus: Arc<ObserverBus>) -> Self {
        let training_buffer = Arc::new(BoundedEventQueue::new(config.training_buffer_capacity));
        let learner = OnlineLearner::new(config.clone(), Arc::clone(&bus));
        Self {
            config,
            training_buffer,
            learner,
            bus,
        }
    }

    /// The currently installed model snapshot.
    #[must_use]
    pub fn model(&self) -> ModelSnapshot {
        self.learner.model()
    }

    /// Training points dropped on a full buffer.
    #[must_use]
    pub fn training_points_dropped(&self) -> u64 {
        self.training_buffer.dropped()
    }

    /// Score and reorder an already-collected batch.
    pub fn optimize_batch(&self, profiles: Vec<TransactionProfile>) -> OrderingResult<OptimizedBatch> {
        let _timer = time_histogram!(ORDERING_BATCH_DURATION);
        let started = Instant::now();

        if profiles.is_empty() {
            return Err(OrderingError::EmptyBatch);
        }
        if profiles.iter().any(|p| p.tx_id.is_empty()) {
            return Err(OrderingError::MissingTxId);
        }

        let batch_size = profiles.len();
        let scored = order_batch(profiles);
        let avg_score = average_score(&scored);
        let confidence = confidence(&scored, self.config.confidence_variance_divisor);
        let optimized_tx_order: Vec<String> =
            scored.iter().map(|s| s.profile.tx_id.clone()).collect();
        // Rough gain model: a confident reorder of a well-scored batch
        // buys the most over submission order.
        let estimated_throughput_gain_percent = (avg_score * confidence / 2.0).clamp(0.0, 90.0);

        let batch = OptimizedBatch {
            result_id: Uuid::new_v4(),
            optimized_tx_order,
            avg_score,
            confidence,
            optimization_reason: format!(
                "score-descending stable order over {batch_size} transactions"
            ),
            processing_time_ms: started.elapsed().as_millis() as u64,
            batch_size,
            estimated_throughput_gain_percent,
        };

        ORDERING_BATCHES.inc();
        self.bus
            .publish(&Event::new(EventPayload::OrderingBatchOptimized {
                result_id: batch.result_id,
                batch_size,
                avg_score,
                confidence,
            }));

        // Record the observation without blocking the reply: a full
        // buffer drops the newest point and counts it.
        let accepted = self.training_buffer.offer(TrainingDataPoint {
            ordered_tx_ids: batch.optimized_tx_order.clone(),
            quality_score: confidence,
            timestamp: unix_now_millis(),
        });
        if !accepted {
            TRAINING_POINTS_DROPPED.inc();
            debug!("Training buffer full, observation dropped");
        }

        info!(
            batch_size,
            avg_score,
            confidence,
            "Batch optimization complete"
        );
        Ok(batch)
    }

    /// Feed back completed transactions; see
    /// [`OnlineLearner::update_models_incrementally`].
    pub fn update_models_incrementally(
        &self,
        block_number: u64,
        completed: Vec<CompletedTx>,
    ) -> Option<JoinHandle<()>> {
        self.learner.update_models_incrementally(
            block_number,
            completed,
            Arc::clone(&self.training_buffer),
        )
    }
}

#[async_trait]
impl OrderingApi for OrderingService {
    async fn optimize_transaction_order(
        &self,
        mut requests: mpsc::Receiver<TransactionProfile>,
    ) -> OrderingResult<OptimizedBatch> {
        let mut profiles = Vec::new();
        while let Some(profile) = requests.recv().await {
            profiles.push(profile);
        }
        self.optimize_batch(profiles)
    }
}
