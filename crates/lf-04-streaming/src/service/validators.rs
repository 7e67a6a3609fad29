//! # Validator Service
//!
//! Periodic-update streams: each subscription carries its own push
//! cadence, and a ticker task computes the current snapshot per tick and
//! pushes it into the subscriber's bounded queue. Subscribers that stop
//! reading are evicted after the idle timeout; a departed consumer stops
//! the ticker immediately.

use crate::config::StreamingConfig;
use crate::domain::{StreamError, StreamResult, ValidatorInfo, ValidatorSubscriptionRequest};
use fabric_telemetry::metrics::{SUBSCRIPTIONS_ACTIVE, SUBSCRIPTIONS_EVICTED};
use parking_lot::RwLock;
use shared_bus::{BoundedEventQueue, Event, EventPayload, ObserverBus, SinkError};
use shared_types::unix_now_secs;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Validator registry plus periodic-push subscriptions.
pub struct ValidatorService {
    config: StreamingConfig,
    validators: Arc<RwLock<HashMap<String, ValidatorInfo>>>,
    bus: Arc<ObserverBus>,
}

impl ValidatorService {
    /// Create a service publishing on `bus`.
    #[must_use]
    pub fn new(config: StreamingConfig, bus: Arc<ObserverBus>) -> Self {
        Self {
            config,
            validators: Arc::new(RwLock::new(HashMap::new())),
            bus,
        }
    }

    /// Insert or update a validator and publish the change.
    pub fn upsert_validator(&self, info: ValidatorInfo) {
        self.bus.publish(&Event::new(EventPayload::ValidatorStatusUpdate {
            validator_id: info.validator_id.clone(),
            active: info.active,
            stake: info.stake,
        }));
        self.validators
            .write()
            .insert(info.validator_id.clone(), info);
    }

    /// Point-in-time view of one validator.
    pub fn get_validator(&self, validator_id: &str) -> StreamResult<ValidatorInfo> {
        self.validators
            .read()
            .get(validator_id)
            .cloned()
            .ok_or_else(|| StreamError::UnknownValidator(validator_id.to_string()))
    }

    /// All validators currently tracked.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ValidatorInfo> {
        self.validators.read().values().cloned().collect()
    }

    /// Open a periodic-update subscription.
    ///
    /// Every `update_interval_ms` the server computes the snapshot
    /// restricted to the requested validator ids and pushes one event
    /// per validator. Overflow drops the newest update; only a departed
    /// or idle consumer ends the stream.
    #[must_use]
    pub fn subscribe(&self, req: ValidatorSubscriptionRequest) -> ValidatorSubscription {
        let interval_ms = if req.update_interval_ms == 0 {
            self.config.default_update_interval_ms
        } else {
            req.update_interval_ms
        };
        let queue = Arc::new(BoundedEventQueue::new(self.config.queue_capacity));
        let sink = queue.sink();
        let last_read_at = Arc::new(AtomicU64::new(unix_now_secs()));
        let idle_timeout = self.config.idle_timeout_secs;
        let validators = Arc::clone(&self.validators);
        let wanted: Vec<String> = req.validator_ids.clone();

        SUBSCRIPTIONS_ACTIVE.with_label_values(&["validators"]).inc();
        info!(
            client_id = %req.client_id,
            interval_ms,
            validators = wanted.len(),
            "Validator subscription opened"
        );

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let reader_clock = Arc::clone(&last_read_at);
        let client_id = req.client_id.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_millis(interval_ms));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let reason = loop {
                tick.tick().await;

                if stop_flag.load(Ordering::Acquire) {
                    break "cancelled";
                }
                let idle = unix_now_secs().saturating_sub(reader_clock.load(Ordering::Relaxed));
                if idle > idle_timeout {
                    break "idle";
                }

                let snapshot: Vec<ValidatorInfo> = {
                    let validators = validators.read();
                    validators
                        .values()
                        .filter(|v| wanted.is_empty() || wanted.contains(&v.validator_id))
                        .cloned()
                        .collect()
                };

                let mut closed = false;
                for info in snapshot {
                    let event = Event::new(EventPayload::ValidatorStatusUpdate {
                        validator_id: info.validator_id,
                        active: info.active,
                        stake: info.stake,
                    });
                    match shared_bus::EventSink::deliver(&sink, &event) {
                        Ok(()) | Err(SinkError::Overflow) => {}
                        Err(SinkError::Closed) => {
                            closed = true;
                            break;
                        }
                    }
                }
                if closed {
                    break "sink_error";
                }
            };
            SUBSCRIPTIONS_ACTIVE.with_label_values(&["validators"]).dec();
            SUBSCRIPTIONS_EVICTED.with_label_values(&[reason]).inc();
            debug!(client_id = %client_id, reason, "Validator subscription ended");
        });

        ValidatorSubscription {
            queue,
            last_read_at,
            stop,
        }
    }
}

/// A live periodic-update subscription.
pub struct ValidatorSubscription {
    queue: Arc<BoundedEventQueue<Event>>,
    last_read_at: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
}

impl ValidatorSubscription {
    /// Next pushed update, waiting up to `timeout`. Reading keeps the
    /// subscription from idle eviction.
    pub async fn next(&self, timeout: Duration) -> Option<Event> {
        self.last_read_at.store(unix_now_secs(), Ordering::Relaxed);
        self.queue.poll(timeout).await
    }

    /// Updates dropped because the push queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// Cancel the subscription. The ticker winds down at its next tick.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Release);
    }
}

impl Drop for ValidatorSubscription {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}
