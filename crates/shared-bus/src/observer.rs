//! # Observer Bus
//!
//! Per-topic subscriber lists with snapshot fan-out. `publish` iterates a
//! point-in-time copy of the subscriber list, so concurrent subscribe and
//! unsubscribe never invalidate a delivery pass, and no lock is held while
//! a sink runs.
//!
//! ## Failure Isolation
//!
//! Delivery to each subscriber is attempted independently. A sink that
//! reports [`SinkError::Closed`] is evicted — no retry, no queue
//! accumulation. [`SinkError::Overflow`] is counted and the subscriber
//! kept; overflow alone never tears a subscription down.

use crate::events::{Event, EventFilter, EventTopic};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors a sink can report on delivery.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The sink's buffer is full; the event was dropped (drop-newest).
    /// Non-fatal: the subscription stays.
    #[error("Sink buffer full, event dropped")]
    Overflow,

    /// The receiving side is gone. Fatal: the subscription is evicted.
    #[error("Sink closed")]
    Closed,
}

/// Push handle that receives events for one subscriber.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Must not block.
    fn deliver(&self, event: &Event) -> Result<(), SinkError>;
}

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Receiving events.
    Active,
    /// Marked for removal; the next snapshot rebuild excludes it.
    Closing,
    /// Removed from the live list.
    Closed,
}

const STATE_ACTIVE: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_CLOSED: u8 = 2;

struct Subscriber {
    id: u64,
    filter: EventFilter,
    sink: Arc<dyn EventSink>,
    state: AtomicU8,
}

impl Subscriber {
    fn state(&self) -> SubscriptionState {
        match self.state.load(Ordering::Acquire) {
            STATE_ACTIVE => SubscriptionState::Active,
            STATE_CLOSING => SubscriptionState::Closing,
            _ => SubscriptionState::Closed,
        }
    }

    fn mark_closing(&self) {
        let _ = self.state.compare_exchange(
            STATE_ACTIVE,
            STATE_CLOSING,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    fn mark_closed(&self) {
        self.state.store(STATE_CLOSED, Ordering::Release);
    }
}

/// Opaque handle identifying one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    topic: EventTopic,
    id: u64,
}

impl SubscriptionHandle {
    /// The topic this subscription listens on.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        self.topic
    }
}

/// Snapshot-based fan-out bus.
pub struct ObserverBus {
    topics: RwLock<HashMap<EventTopic, Arc<Vec<Arc<Subscriber>>>>>,
    next_id: AtomicU64,
    delivered: AtomicU64,
    overflow_drops: AtomicU64,
}

impl ObserverBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            delivered: AtomicU64::new(0),
            overflow_drops: AtomicU64::new(0),
        }
    }

    /// Register a sink for `topic`. O(1) amortized.
    pub fn subscribe(
        &self,
        topic: EventTopic,
        filter: EventFilter,
        sink: Arc<dyn EventSink>,
    ) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Arc::new(Subscriber {
            id,
            filter,
            sink,
            state: AtomicU8::new(STATE_ACTIVE),
        });

        let mut topics = self.topics.write();
        let list = topics.entry(topic).or_insert_with(|| Arc::new(Vec::new()));
        let mut next: Vec<Arc<Subscriber>> = list.as_ref().clone();
        next.push(subscriber);
        *list = Arc::new(next);

        debug!(?topic, subscription_id = id, "Subscription created");
        SubscriptionHandle { topic, id }
    }

    /// Remove a subscription. Idempotent.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) {
        let removed = self.remove_subscribers(handle.topic, &[handle.id]);
        if removed > 0 {
            debug!(topic = ?handle.topic, subscription_id = handle.id, "Subscription removed");
        }
    }

    /// Deliver `event` to every active subscriber of its topic whose
    /// filter matches. Returns the number of successful deliveries.
    pub fn publish(&self, event: &Event) -> usize {
        let topic = event.topic();
        let snapshot = {
            let topics = self.topics.read();
            match topics.get(&topic) {
                Some(list) => Arc::clone(list),
                None => return 0,
            }
        };

        let mut delivered = 0;
        let mut failed: Vec<u64> = Vec::new();

        for subscriber in snapshot.iter() {
            if subscriber.state() != SubscriptionState::Active {
                continue;
            }
            if !subscriber.filter.matches(event) {
                continue;
            }
            match subscriber.sink.deliver(event) {
                Ok(()) => delivered += 1,
                Err(SinkError::Overflow) => {
                    self.overflow_drops.fetch_add(1, Ordering::Relaxed);
                }
                Err(SinkError::Closed) => {
                    subscriber.mark_closing();
                    failed.push(subscriber.id);
                    debug!(
                        ?topic,
                        subscription_id = subscriber.id,
                        "Sink failed, evicting subscription"
                    );
                }
            }
        }

        if !failed.is_empty() {
            self.remove_subscribers(topic, &failed);
        }

        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Number of live subscriptions on a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: EventTopic) -> usize {
        self.topics
            .read()
            .get(&topic)
            .map(|list| {
                list.iter()
                    .filter(|s| s.state() == SubscriptionState::Active)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Total successful deliveries since construction.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Total events dropped to full sinks since construction.
    #[must_use]
    pub fn overflow_drops(&self) -> u64 {
        self.overflow_drops.load(Ordering::Relaxed)
    }

    /// Swap in a new subscriber list without the given ids. Returns how
    /// many entries were removed.
    fn remove_subscribers(&self, topic: EventTopic, ids: &[u64]) -> usize {
        let mut topics = self.topics.write();
        let Some(list) = topics.get_mut(&topic) else {
            return 0;
        };

        let before = list.len();
        let next: Vec<Arc<Subscriber>> = list
            .iter()
            .filter(|s| {
                if ids.contains(&s.id) {
                    s.mark_closed();
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();
        let removed = before - next.len();
        *list = Arc::new(next);
        removed
    }
}

impl Default for ObserverBus {
    fn default() -> Self {
        Self::new()
    }
}
