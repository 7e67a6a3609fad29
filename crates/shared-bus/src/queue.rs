//! # Bounded Event Queue
//!
//! Multi-producer, single-consumer hand-off with bounded memory. `offer`
//! never blocks; when the queue is full the newest item is dropped and
//! counted. `poll` blocks the single consumer up to a timeout.
//!
//! [`QueueSink`] adapts a queue into an observer-bus sink: overflow maps
//! to the non-fatal [`SinkError::Overflow`], a dropped consumer maps to
//! [`SinkError::Closed`].

use crate::events::Event;
use crate::observer::{EventSink, SinkError};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio_stream::Stream;

/// Bounded MPSC queue with drop-newest overflow.
pub struct BoundedEventQueue<T> {
    tx: mpsc::Sender<T>,
    rx: Mutex<mpsc::Receiver<T>>,
    capacity: usize,
    len: Arc<AtomicUsize>,
    dropped: Arc<AtomicU64>,
}

impl<T: Send + 'static> BoundedEventQueue<T> {
    /// Create a queue holding at most `capacity` items.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
            len: Arc::new(AtomicUsize::new(0)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Non-blocking enqueue. Returns `false` when the item was dropped
    /// (queue full or consumer gone); full-queue drops are counted.
    pub fn offer(&self, item: T) -> bool {
        match self.tx.try_send(item) {
            Ok(()) => {
                self.len.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Receive the next item, waiting up to `timeout`.
    ///
    /// Returns `None` on timeout or when all producers are gone and the
    /// queue is drained. Single-consumer: concurrent callers serialize.
    pub async fn poll(&self, timeout: Duration) -> Option<T> {
        let mut rx = self.rx.lock().await;
        let item = tokio::time::timeout(timeout, rx.recv()).await.ok().flatten();
        if item.is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        item
    }

    /// Items currently buffered. Approximate under concurrent offers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Whether the queue is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-blocking receive.
    ///
    /// - `Ok(Some(item))` - an item was ready
    /// - `Ok(None)` - nothing ready right now (or the consumer side is
    ///   busy elsewhere)
    /// - `Err(QueueClosed)` - all producers gone and the queue drained
    pub fn try_poll(&self) -> Result<Option<T>, QueueClosed> {
        let Ok(mut rx) = self.rx.try_lock() else {
            return Ok(None);
        };
        match rx.try_recv() {
            Ok(item) => {
                self.len.fetch_sub(1, Ordering::Relaxed);
                Ok(Some(item))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(QueueClosed),
        }
    }

    /// A `Stream` view over this queue. Single consumer: the stream and
    /// direct `poll` calls drain the same items.
    #[must_use]
    pub fn stream(self: &Arc<Self>) -> QueueStream<T> {
        QueueStream {
            queue: Arc::clone(self),
        }
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// All producers are gone and the queue is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueClosed;

/// A stream wrapper over a [`BoundedEventQueue`], for use with stream
/// combinators.
pub struct QueueStream<T> {
    queue: Arc<BoundedEventQueue<T>>,
}

impl<T: Send + 'static> Stream for QueueStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.queue.try_poll() {
            Ok(Some(item)) => Poll::Ready(Some(item)),
            Ok(None) => {
                // Nothing ready; re-arm and yield.
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(QueueClosed) => Poll::Ready(None),
        }
    }
}

impl BoundedEventQueue<Event> {
    /// An observer-bus sink feeding this queue.
    ///
    /// The sink holds only a producer handle: dropping the queue (the
    /// consumer) makes subsequent deliveries fail `Closed`, which evicts
    /// the subscription.
    #[must_use]
    pub fn sink(&self) -> QueueSink {
        QueueSink {
            tx: self.tx.clone(),
            len: Arc::clone(&self.len),
            dropped: Arc::clone(&self.dropped),
        }
    }
}

/// [`EventSink`] adapter over a [`BoundedEventQueue`] producer handle.
pub struct QueueSink {
    tx: mpsc::Sender<Event>,
    len: Arc<AtomicUsize>,
    dropped: Arc<AtomicU64>,
}

impl EventSink for QueueSink {
    fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        match self.tx.try_send(event.clone()) {
            Ok(()) => {
                self.len.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(SinkError::Overflow)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SinkError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventFilter, EventPayload, EventTopic};
    use crate::observer::ObserverBus;
    use shared_types::TransactionStatus;

    fn tx_event(n: u32) -> Event {
        Event::new(EventPayload::TransactionStatusChanged {
            tx_id: format!("tx-{n}"),
            status: TransactionStatus::Pending,
            confirmations: n,
        })
    }

    #[tokio::test]
    async fn test_offer_then_poll_fifo() {
        let queue = BoundedEventQueue::new(8);
        assert!(queue.offer(1));
        assert!(queue.offer(2));
        assert!(queue.offer(3));

        assert_eq!(queue.poll(Duration::from_millis(50)).await, Some(1));
        assert_eq!(queue.poll(Duration::from_millis(50)).await, Some(2));
        assert_eq!(queue.poll(Duration::from_millis(50)).await, Some(3));
    }

    #[tokio::test]
    async fn test_len_tracks_offer_and_poll() {
        let queue = BoundedEventQueue::new(8);
        assert!(queue.is_empty());
        queue.offer(1u32);
        queue.offer(2);
        assert_eq!(queue.len(), 2);

        queue.poll(Duration::from_millis(50)).await;
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_poll_times_out_when_empty() {
        let queue: BoundedEventQueue<u32> = BoundedEventQueue::new(8);
        let polled = queue.poll(Duration::from_millis(20)).await;
        assert!(polled.is_none());
    }

    #[tokio::test]
    async fn test_offer_drops_newest_when_full() {
        let queue = BoundedEventQueue::new(2);
        assert!(queue.offer(1));
        assert!(queue.offer(2));
        assert!(!queue.offer(3));
        assert_eq!(queue.dropped(), 1);

        // The rejected item never displaced an accepted one.
        assert_eq!(queue.poll(Duration::from_millis(50)).await, Some(1));
        assert_eq!(queue.poll(Duration::from_millis(50)).await, Some(2));
    }

    #[tokio::test]
    async fn test_queue_sink_overflow_is_counted() {
        let queue = BoundedEventQueue::new(1);
        let sink = queue.sink();

        assert!(sink.deliver(&tx_event(1)).is_ok());
        assert_eq!(sink.deliver(&tx_event(2)), Err(SinkError::Overflow));
        assert_eq!(queue.dropped(), 1);
    }

    #[tokio::test]
    async fn test_queue_sink_reports_closed_after_consumer_drop() {
        let queue = BoundedEventQueue::new(4);
        let sink = queue.sink();
        drop(queue);

        assert_eq!(sink.deliver(&tx_event(1)), Err(SinkError::Closed));
    }

    #[tokio::test]
    async fn test_stream_view_drains_then_waits() {
        use tokio_stream::StreamExt;

        let queue = Arc::new(BoundedEventQueue::new(8));
        queue.offer(1u32);
        queue.offer(2);

        let mut stream = queue.stream();
        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));

        // A drained live stream waits for the next item rather than
        // ending.
        let pending = tokio::time::timeout(Duration::from_millis(20), stream.next()).await;
        assert!(pending.is_err());

        queue.offer(3);
        assert_eq!(stream.next().await, Some(3));
    }

    #[tokio::test]
    async fn test_bus_delivery_through_queue_sink() {
        let bus = ObserverBus::new();
        let queue = BoundedEventQueue::new(16);
        bus.subscribe(
            EventTopic::Transactions,
            EventFilter::all(),
            Arc::new(queue.sink()),
        );

        bus.publish(&tx_event(1));
        bus.publish(&tx_event(2));

        let first = queue.poll(Duration::from_millis(50)).await.unwrap();
        let second = queue.poll(Duration::from_millis(50)).await.unwrap();
        match (&first.payload, &second.payload) {
            (
                EventPayload::TransactionStatusChanged { confirmations: a, .. },
                EventPayload::TransactionStatusChanged { confirmations: b, .. },
            ) => {
                assert_eq!((*a, *b), (1, 2));
            }
            other => panic!("unexpected payloads: {other:?}"),
        }
    }
}
