//! # Online Learner
//!
//! Interval-gated incremental model updates that never block the calling
//! thread: eligible updates are handed to a semaphore-bounded worker and
//! the caller returns immediately.
//!
//! An update blends the observed execution quality into the current
//! accuracy at the adaptive learning rate. A snapshot is installed only
//! when the resulting accuracy clears the accept threshold, bumping the
//! version by exactly one; anything below the bar is discarded.

use crate::config::OrderingConfig;
use crate::domain::{CompletedTx, ModelSnapshot, TrainingDataPoint};
use fabric_telemetry::metrics::{MALFORMED_TRAINING_INPUTS, MODEL_UPDATES};
use parking_lot::{Mutex, RwLock};
use shared_bus::{BoundedEventQueue, Event, EventPayload, ObserverBus};
use shared_types::unix_now_millis;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Learning-rate bounds; adaptation never leaves this band.
const LEARNING_RATE_MIN: f64 = 0.001;
const LEARNING_RATE_MAX: f64 = 0.1;
/// Maximum relative learning-rate change per update.
const LEARNING_RATE_STEP: f64 = 0.05;

/// The online learning loop.
pub struct OnlineLearner {
    config: OrderingConfig,
    workers: Arc<Semaphore>,
    model: RwLock<ModelSnapshot>,
    learning_rate: Mutex<f64>,
    bus: Arc<ObserverBus>,
}

impl OnlineLearner {
    /// Create a learner starting from the bootstrap model.
    #[must_use]
    pub fn new(config: OrderingConfig, bus: Arc<ObserverBus>) -> Arc<Self> {
        Self::with_model(config, ModelSnapshot::initial("tx-ordering"), bus)
    }

    /// Create a learner continuing from a recovered snapshot.
    #[must_use]
    pub fn with_model(
        config: OrderingConfig,
        model: ModelSnapshot,
        bus: Arc<ObserverBus>,
    ) -> Arc<Self> {
        let workers = Arc::new(Semaphore::new(config.worker_pool_size));
        let learning_rate = config
            .initial_learning_rate
            .clamp(LEARNING_RATE_MIN, LEARNING_RATE_MAX);
        Arc::new(Self {
            config,
            workers,
            model: RwLock::new(model),
            learning_rate: Mutex::new(learning_rate),
            bus,
        })
    }

    /// The currently installed model.
    #[must_use]
    pub fn model(&self) -> ModelSnapshot {
        self.model.read().clone()
    }

    /// Current learning rate. Always within `[0.001, 0.1]`.
    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        *self.learning_rate.lock()
    }

    /// Feed back completed transactions after block execution.
    ///
    /// A no-op unless `block_number` is a multiple of the configured
    /// interval. When eligible, the batch is processed on the bounded
    /// worker pool and the caller returns immediately; the returned
    /// handle resolves when the background run finishes.
    pub fn update_models_incrementally(
        self: &Arc<Self>,
        block_number: u64,
        completed: Vec<CompletedTx>,
        training_buffer: Arc<BoundedEventQueue<TrainingDataPoint>>,
    ) -> Option<JoinHandle<()>> {
        if block_number % self.config.model_update_interval_blocks != 0 {
            MODEL_UPDATES.with_label_values(&["skipped"]).inc();
            return None;
        }

        let learner = Arc::clone(self);
        Some(tokio::spawn(async move {
            let Ok(_permit) = learner.workers.clone().acquire_owned().await else {
                return;
            };
            learner.run_update(block_number, completed, training_buffer).await;
        }))
    }

    /// One synchronous update pass. Runs on a worker.
    async fn run_update(
        &self,
        block_number: u64,
        completed: Vec<CompletedTx>,
        training_buffer: Arc<BoundedEventQueue<TrainingDataPoint>>,
    ) {
        let total = completed.len();
        let valid: Vec<CompletedTx> = completed.into_iter().filter(CompletedTx::is_well_formed).collect();
        let malformed = total - valid.len();
        if malformed > 0 {
            MALFORMED_TRAINING_INPUTS.inc_by(malformed as f64);
            debug!(block_number, malformed, "Skipped malformed training inputs");
        }

        // Drain recent observations; the buffer keeps what we leave.
        let mut drained: Vec<TrainingDataPoint> = Vec::new();
        while drained.len() < self.config.drain_batch_limit {
            match training_buffer.poll(Duration::from_millis(1)).await {
                Some(point) => drained.push(point),
                None => break,
            }
        }

        let mut samples: Vec<f64> = valid.iter().map(|c| c.quality_score).collect();
        samples.extend(drained.iter().map(|p| p.quality_score));
        if samples.is_empty() {
            MODEL_UPDATES.with_label_values(&["rejected"]).inc();
            return;
        }
        let batch_quality = samples.iter().sum::<f64>() / samples.len() as f64;

        let (accuracy, rate) = {
            let current = self.model.read().accuracy;
            let mut rate = self.learning_rate.lock();
            // Bounded-step adaptation: grow while improving, shrink
            // otherwise, never more than 5% at a time.
            let factor = if batch_quality > current {
                1.0 + LEARNING_RATE_STEP
            } else {
                1.0 - LEARNING_RATE_STEP
            };
            *rate = (*rate * factor).clamp(LEARNING_RATE_MIN, LEARNING_RATE_MAX);
            let accuracy = (current + *rate * (batch_quality - current)).clamp(0.0, 1.0);
            (accuracy, *rate)
        };

        if accuracy < self.config.accept_accuracy_threshold {
            MODEL_UPDATES.with_label_values(&["rejected"]).inc();
            debug!(
                block_number,
                accuracy,
                threshold = self.config.accept_accuracy_threshold,
                "Model update below accept threshold, discarded"
            );
            return;
        }

        let snapshot = {
            let mut model = self.model.write();
            let next = ModelSnapshot {
                model_name: model.model_name.clone(),
                version: model.version + 1,
                weights: encode_weights(rate, accuracy),
                accuracy,
                installed_at: unix_now_millis(),
            };
            *model = next.clone();
            next
        };

        MODEL_UPDATES.with_label_values(&["installed"]).inc();
        self.bus.publish(&Event::new(EventPayload::ModelInstalled {
            model_name: snapshot.model_name.clone(),
            version: snapshot.version,
            accuracy: snapshot.accuracy,
        }));
        info!(
            block_number,
            version = snapshot.version,
            accuracy = snapshot.accuracy,
            learning_rate = rate,
            samples = samples.len(),
            "Model snapshot installed"
        );
    }
}

/// Serialize the model parameters. The format is opaque to callers.
fn encode_weights(learning_rate: f64, accuracy: f64) -> Vec<u8> {
    serde_json::json!({
        "learning_rate": learning_rate,
        "accuracy": accuracy,
    })
    .to_string()
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> Arc<BoundedEventQueue<TrainingDataPoint>> {
        Arc::new(BoundedEventQueue::new(64))
    }

    fn completed(quality: f64) -> Vec<CompletedTx> {
        vec![CompletedTx {
            tx_id: "t1".to_string(),
            quality_score: quality,
        }]
    }

    fn learner(accept_threshold: f64, interval: u64) -> Arc<OnlineLearner> {
        OnlineLearner::new(
            OrderingConfig {
                accept_accuracy_threshold: accept_threshold,
                model_update_interval_blocks: interval,
                ..Default::default()
            },
            Arc::new(ObserverBus::new()),
        )
    }

    #[tokio::test]
    async fn test_off_interval_is_noop() {
        let l = learner(0.0, 1_000);
        assert!(l
            .update_models_incrementally(999, completed(1.0), buffer())
            .is_none());
        assert_eq!(l.model().version, 0);
    }

    #[tokio::test]
    async fn test_accepted_update_bumps_version_by_one() {
        let l = learner(0.0, 1_000);
        let handle = l
            .update_models_incrementally(1_000, completed(1.0), buffer())
            .expect("eligible");
        handle.await.unwrap();

        let model = l.model();
        assert_eq!(model.version, 1);
        assert!(model.accuracy > 0.5);
        assert!(!model.weights.is_empty());
    }

    #[tokio::test]
    async fn test_below_threshold_is_discarded() {
        let l = learner(0.99, 1_000);
        let handle = l
            .update_models_incrementally(1_000, completed(0.6), buffer())
            .expect("eligible");
        handle.await.unwrap();

        assert_eq!(l.model().version, 0);
    }

    #[tokio::test]
    async fn test_malformed_inputs_are_skipped_not_fatal() {
        let l = learner(0.0, 1_000);
        let batch = vec![
            CompletedTx {
                tx_id: String::new(),
                quality_score: 0.9,
            },
            CompletedTx {
                tx_id: "t1".to_string(),
                quality_score: f64::NAN,
            },
            CompletedTx {
                tx_id: "t2".to_string(),
                quality_score: 0.9,
            },
        ];
        let handle = l
            .update_models_incrementally(1_000, batch, buffer())
            .expect("eligible");
        handle.await.unwrap();

        // The one valid sample still produced an update.
        assert_eq!(l.model().version, 1);
    }

    #[tokio::test]
    async fn test_all_malformed_batch_rejected() {
        let l = learner(0.0, 1_000);
        let batch = vec![CompletedTx {
            tx_id: String::new(),
            quality_score: 0.9,
        }];
        let handle = l
            .update_models_incrementally(1_000, batch, buffer())
            .expect("eligible");
        handle.await.unwrap();

        assert_eq!(l.model().version, 0);
    }

    #[tokio::test]
    async fn test_learning_rate_stays_bounded() {
        let l = learner(0.0, 1);
        for block in 1..=60 {
            let quality = if block % 2 == 0 { 1.0 } else { 0.0 };
            if let Some(handle) = l.update_models_incrementally(block, completed(quality), buffer())
            {
                handle.await.unwrap();
            }
            let rate = l.learning_rate();
            assert!((LEARNING_RATE_MIN..=LEARNING_RATE_MAX).contains(&rate));
        }
    }

    #[tokio::test]
    async fn test_version_monotonic_per_update() {
        let l = learner(0.0, 1);
        let mut last = 0;
        for block in 1..=5 {
            let handle = l
                .update_models_incrementally(block, completed(0.9), buffer())
                .expect("eligible");
            handle.await.unwrap();
            let version = l.model().version;
            assert!(version == last || version == last + 1);
            last = version;
        }
    }

    #[tokio::test]
    async fn test_training_buffer_contributes_samples() {
        let l = learner(0.0, 1_000);
        let buf = buffer();
        buf.offer(TrainingDataPoint {
            ordered_tx_ids: vec!["a".to_string()],
            quality_score: 1.0,
            timestamp: 1,
        });

        // No completed txs at all: the drained buffer alone drives the
        // update.
        let handle = l
            .update_models_incrementally(1_000, Vec::new(), buf)
            .expect("eligible");
        handle.await.unwrap();
        assert_eq!(l.model().version, 1);
    }
}
