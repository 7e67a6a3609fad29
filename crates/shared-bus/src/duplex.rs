//! # Duplex Session
//!
//! Bidirectional streams are modeled as a pair of bounded queues plus a
//! cancellation token: the client end writes requests and reads pushes,
//! the server end does the reverse. Either side can cancel; workers
//! observe cancellation between messages.

use tokio::sync::{mpsc, watch};

/// Create a connected client/server pair with the given queue capacity.
#[must_use]
pub fn duplex<In, Out>(capacity: usize) -> (ClientEnd<In, Out>, ServerEnd<In, Out>) {
    let (in_tx, in_rx) = mpsc::channel(capacity);
    let (out_tx, out_rx) = mpsc::channel(capacity);
    let (cancel_tx, cancel_rx) = watch::channel(false);

    (
        ClientEnd {
            requests: in_tx,
            responses: out_rx,
            cancel: CancelHandle { tx: cancel_tx },
        },
        ServerEnd {
            requests: in_rx,
            responses: out_tx,
            cancelled: CancelToken { rx: cancel_rx },
        },
    )
}

/// Requests a session stop; observed by the server between messages.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Server-side view of the cancellation signal.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when cancellation is requested (or the client end is gone).
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// The caller's end: send requests, read pushes, cancel.
pub struct ClientEnd<In, Out> {
    /// Request queue into the server.
    pub requests: mpsc::Sender<In>,
    /// Push queue out of the server.
    pub responses: mpsc::Receiver<Out>,
    /// Cancellation handle.
    pub cancel: CancelHandle,
}

/// The handler's end: read requests, push responses, observe cancel.
pub struct ServerEnd<In, Out> {
    /// Request queue from the client.
    pub requests: mpsc::Receiver<In>,
    /// Push queue back to the client.
    pub responses: mpsc::Sender<Out>,
    /// Cancellation signal.
    pub cancelled: CancelToken,
}
