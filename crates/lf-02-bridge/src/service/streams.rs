//! Stream-shaped bridge operations.
//!
//! Bidirectional calls are a pair of bounded queues plus a cancellation
//! token; server streams are a spawned forwarder feeding a bounded
//! channel the client drains. Transient stream errors end the session
//! without touching the voting round.

use super::BridgeCoordinator;
use crate::domain::{
    BatchSummary, BridgeTransferRequest, OracleVoteMessage, PendingTransferNotice,
    VerificationResult,
};
use crate::ports::inbound::BridgeApi;
use shared_bus::{duplex, BoundedEventQueue, ClientEnd, Event, EventFilter, EventTopic};
use shared_bus::{ObserverBus, SubscriptionHandle};
use shared_types::ChainId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// How long the pending-transfer forwarder waits per poll before
/// re-checking for a departed client.
const PENDING_POLL_INTERVAL: Duration = Duration::from_millis(250);

impl BridgeCoordinator {
    /// Open the bidirectional verification stream.
    ///
    /// Each inbound vote is recorded; whenever a vote completes a round,
    /// one [`VerificationResult`] is pushed outbound. The session ends on
    /// cancellation or when the client drops its request end.
    pub fn open_verify_stream(
        self: &Arc<Self>,
        capacity: usize,
    ) -> ClientEnd<OracleVoteMessage, VerificationResult> {
        let (client, server) = duplex(capacity);
        let shared_bus::ServerEnd::<OracleVoteMessage, VerificationResult> {
            mut requests,
            responses,
            mut cancelled,
        } = server;

        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancelled.cancelled() => break,
                    msg = requests.recv() => {
                        let Some(msg) = msg else { break };
                        let result = coordinator
                            .submit_vote(&msg.bridge_id, &msg.oracle_address, msg.approved, &msg.reason)
                            .await;
                        if let Some(result) = result {
                            if responses.send(result).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
            debug!("Verification stream closed");
        });

        client
    }

    /// Ingest a stream of transfer requests; reply once with a summary
    /// when the client closes its end.
    pub async fn batch_transfers(
        &self,
        mut requests: mpsc::Receiver<BridgeTransferRequest>,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        while let Some(req) = requests.recv().await {
            let bridge_id = req.bridge_id.clone();
            match self.initiate_transfer(req).await {
                Ok(_) => summary.accepted += 1,
                Err(e) => {
                    summary.rejected += 1;
                    summary.failed_ids.push(bridge_id);
                    summary.errors.push(e.to_string());
                }
            }
        }
        summary
    }

    /// Server stream of pending transfers, optionally filtered by source
    /// chain. Non-matching entries are consumed and skipped. The
    /// forwarder stops when the client drops the receiver.
    pub fn stream_pending_transfers(
        self: &Arc<Self>,
        filter: Option<ChainId>,
        capacity: usize,
    ) -> mpsc::Receiver<PendingTransferNotice> {
        let queue = self.pending_queue();
        let (tx, rx) = mpsc::channel(capacity);

        tokio::spawn(async move {
            loop {
                if tx.is_closed() {
                    break;
                }
                let Some(notice) = queue.poll(PENDING_POLL_INTERVAL).await else {
                    continue;
                };
                if filter.map(|chain| notice.source_chain == chain).unwrap_or(true)
                    && tx.send(notice).await.is_err()
                {
                    break;
                }
            }
            debug!("Pending-transfer stream closed");
        });

        rx
    }

    /// Attach a monitor to the status observer bus. Every transition
    /// published after attachment is pushed; a full queue drops the
    /// newest update rather than evicting the monitor.
    #[must_use]
    pub fn monitor_status(&self, bridge_ids: Vec<String>, capacity: usize) -> StatusMonitor {
        let queue = Arc::new(BoundedEventQueue::new(capacity));
        let filter = EventFilter {
            topics: vec![EventTopic::Bridge],
            entity_ids: bridge_ids,
            ..Default::default()
        };
        let handle = self
            .bus()
            .subscribe(EventTopic::Bridge, filter, Arc::new(queue.sink()));
        StatusMonitor {
            queue,
            handle,
            bus: self.bus(),
        }
    }
}

/// A live status subscription.
pub struct StatusMonitor {
    queue: Arc<BoundedEventQueue<Event>>,
    handle: SubscriptionHandle,
    bus: Arc<ObserverBus>,
}

impl StatusMonitor {
    /// Next pushed event, waiting up to `timeout`.
    pub async fn next(&self, timeout: Duration) -> Option<Event> {
        self.queue.poll(timeout).await
    }

    /// Detach from the bus. Idempotent.
    pub fn close(&self) {
        self.bus.unsubscribe(&self.handle);
    }

    /// Updates dropped because this monitor's queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.handle);
    }
}
