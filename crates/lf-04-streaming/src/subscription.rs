//! # Subscription Manager
//!
//! Binds the observer bus to per-subscriber bounded queues. Every
//! subscription owns one queue; overflow drops the newest event and
//! counts it without tearing the subscription down, while a departed
//! consumer fails the sink and is evicted by the bus.

use crate::config::StreamingConfig;
use fabric_telemetry::metrics::{SUBSCRIPTIONS_ACTIVE, SUBSCRIPTIONS_EVICTED};
use shared_bus::{BoundedEventQueue, Event, EventFilter, EventTopic, ObserverBus, SubscriptionHandle};
use shared_types::unix_now_secs;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Creates queue-backed subscriptions for one service.
pub struct SubscriptionManager {
    bus: Arc<ObserverBus>,
    config: StreamingConfig,
    service: &'static str,
}

impl SubscriptionManager {
    /// Create a manager labeled with its owning service.
    #[must_use]
    pub fn new(bus: Arc<ObserverBus>, config: StreamingConfig, service: &'static str) -> Self {
        Self {
            bus,
            config,
            service,
        }
    }

    /// The bus this manager subscribes on.
    #[must_use]
    pub fn bus(&self) -> Arc<ObserverBus> {
        Arc::clone(&self.bus)
    }

    /// Queue capacity applied to new subscriptions.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.config.queue_capacity
    }

    /// Idle eviction threshold.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config.idle_timeout_secs)
    }

    /// Open a filtered subscription on `topic`.
    #[must_use]
    pub fn subscribe(&self, topic: EventTopic, filter: EventFilter) -> EventSubscription {
        let queue = Arc::new(BoundedEventQueue::new(self.config.queue_capacity));
        let handle = self.bus.subscribe(topic, filter, Arc::new(queue.sink()));
        SUBSCRIPTIONS_ACTIVE.with_label_values(&[self.service]).inc();
        debug!(service = self.service, ?topic, "Subscription opened");

        EventSubscription {
            queue,
            handle,
            bus: Arc::clone(&self.bus),
            service: self.service,
            last_read_at: AtomicU64::new(unix_now_secs()),
            closed: AtomicBool::new(false),
        }
    }
}

/// A live queue-backed subscription.
pub struct EventSubscription {
    queue: Arc<BoundedEventQueue<Event>>,
    handle: SubscriptionHandle,
    bus: Arc<ObserverBus>,
    service: &'static str,
    last_read_at: AtomicU64,
    closed: AtomicBool,
}

impl EventSubscription {
    /// Next event, waiting up to `timeout`. Reading keeps the
    /// subscription from idle eviction.
    pub async fn next(&self, timeout: Duration) -> Option<Event> {
        self.last_read_at.store(unix_now_secs(), Ordering::Relaxed);
        self.queue.poll(timeout).await
    }

    /// Seconds since the consumer last read.
    #[must_use]
    pub fn idle_for(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_read_at.load(Ordering::Relaxed))
    }

    /// A `Stream` view over this subscription, for combinator-style
    /// consumers. Drains the same queue as [`Self::next`].
    #[must_use]
    pub fn stream(&self) -> shared_bus::QueueStream<Event> {
        self.last_read_at.store(unix_now_secs(), Ordering::Relaxed);
        self.queue.stream()
    }

    /// Events dropped because this subscription's queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// Detach from the bus with an eviction reason. Idempotent.
    pub fn close(&self, reason: &'static str) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.bus.unsubscribe(&self.handle);
        SUBSCRIPTIONS_ACTIVE.with_label_values(&[self.service]).dec();
        SUBSCRIPTIONS_EVICTED.with_label_values(&[reason]).inc();
        debug!(service = self.service, reason, "Subscription closed");
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.close("cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::EventPayload;
    use shared_types::TransactionStatus;

    fn manager(bus: Arc<ObserverBus>, capacity: usize) -> SubscriptionManager {
        SubscriptionManager::new(
            bus,
            StreamingConfig {
                queue_capacity: capacity,
                ..Default::default()
            },
            "test",
        )
    }

    fn tx_event(n: u32) -> Event {
        Event::new(EventPayload::TransactionStatusChanged {
            tx_id: format!("tx-{n}"),
            status: TransactionStatus::Pending,
            confirmations: n,
        })
    }

    #[tokio::test]
    async fn test_subscription_receives_in_publish_order() {
        let bus = Arc::new(ObserverBus::new());
        let sub = manager(bus.clone(), 64).subscribe(EventTopic::Transactions, EventFilter::all());

        for n in 0..5 {
            bus.publish(&tx_event(n));
        }
        for n in 0..5 {
            let event = sub.next(Duration::from_millis(100)).await.unwrap();
            match event.payload {
                EventPayload::TransactionStatusChanged { confirmations, .. } => {
                    assert_eq!(confirmations, n);
                }
                other => panic!("unexpected payload: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_overflow_drops_newest_without_teardown() {
        let bus = Arc::new(ObserverBus::new());
        let sub = manager(bus.clone(), 2).subscribe(EventTopic::Transactions, EventFilter::all());

        for n in 0..5 {
            bus.publish(&tx_event(n));
        }
        assert_eq!(sub.dropped(), 3);
        assert_eq!(bus.subscriber_count(EventTopic::Transactions), 1);

        // The two oldest events survived.
        let first = sub.next(Duration::from_millis(100)).await.unwrap();
        match first.payload {
            EventPayload::TransactionStatusChanged { confirmations, .. } => {
                assert_eq!(confirmations, 0);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_view_yields_published_events() {
        use tokio_stream::StreamExt;

        let bus = Arc::new(ObserverBus::new());
        let sub = manager(bus.clone(), 8).subscribe(EventTopic::Transactions, EventFilter::all());
        bus.publish(&tx_event(7));

        let mut stream = sub.stream();
        let event = stream.next().await.unwrap();
        assert!(matches!(
            event.payload,
            EventPayload::TransactionStatusChanged { confirmations: 7, .. }
        ));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_detaches() {
        let bus = Arc::new(ObserverBus::new());
        let sub = manager(bus.clone(), 8).subscribe(EventTopic::Transactions, EventFilter::all());
        assert_eq!(bus.subscriber_count(EventTopic::Transactions), 1);

        sub.close("cancelled");
        sub.close("cancelled");
        assert_eq!(bus.subscriber_count(EventTopic::Transactions), 0);
    }

    #[tokio::test]
    async fn test_drop_detaches_from_bus() {
        let bus = Arc::new(ObserverBus::new());
        {
            let _sub =
                manager(bus.clone(), 8).subscribe(EventTopic::Transactions, EventFilter::all());
            assert_eq!(bus.subscriber_count(EventTopic::Transactions), 1);
        }
        assert_eq!(bus.subscriber_count(EventTopic::Transactions), 0);
    }

    #[tokio::test]
    async fn test_idle_accounting() {
        let bus = Arc::new(ObserverBus::new());
        let sub = manager(bus, 8).subscribe(EventTopic::Transactions, EventFilter::all());
        let now = unix_now_secs();
        assert!(sub.idle_for(now) <= 1);
        assert!(sub.idle_for(now + 500) >= 499);
    }
}
