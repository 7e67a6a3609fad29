//! # Shared Bus - Event Fan-out for Inter-Subsystem Communication
//!
//! All inter-subsystem notification flows through this crate:
//!
//! - The [`ObserverBus`] delivers each published event to every active
//!   subscriber of its topic through an [`EventSink`], iterating a
//!   point-in-time snapshot of the subscriber list so concurrent
//!   subscribe/unsubscribe never invalidate a delivery pass.
//! - [`BoundedEventQueue`] hands events from many producers to a single
//!   streaming consumer with bounded memory and drop-newest overflow.
//!
//! ## Delivery Rules
//!
//! - Per-publisher, per-subscriber order is preserved.
//! - A slow sink is counted, never waited on; a failed sink is evicted.
//! - No ordering guarantee across topics.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Subsystem A  │                    │ Subsystem B  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Observer Bus │ ─────────┘
//!                  └──────────────┘  subscribe(sink)
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod duplex;
pub mod events;
pub mod observer;
pub mod queue;

// Re-export main types
pub use duplex::{duplex, CancelHandle, CancelToken, ClientEnd, ServerEnd};
pub use events::{Event, EventFilter, EventPayload, EventTopic};
pub use observer::{
    EventSink, ObserverBus, SinkError, SubscriptionHandle, SubscriptionState,
};
pub use queue::{BoundedEventQueue, QueueClosed, QueueSink, QueueStream};

/// Default capacity for per-subscriber bounded queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;
