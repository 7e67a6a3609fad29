//! Bridge coordinator tests.

use super::*;
use crate::config::BridgeConfig;
use crate::domain::OracleVoteMessage;
use crate::ports::outbound::mocks::{MockTimeSource, RejectAllProofs};
use crate::ports::outbound::AcceptAllProofs;
use async_trait::async_trait;
use shared_types::{ChainId, InMemoryRepository, RepositoryError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Repository whose writes can be switched off mid-test.
struct FlakyRepository {
    inner: InMemoryRepository<BridgeTransfer>,
    fail: AtomicBool,
}

impl FlakyRepository {
    fn new() -> Self {
        Self {
            inner: InMemoryRepository::new(),
            fail: AtomicBool::new(false),
        }
    }

    fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Repository<BridgeTransfer> for FlakyRepository {
    async fn persist(&self, entity: &BridgeTransfer) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("store offline".to_string()));
        }
        self.inner.persist(entity).await
    }

    async fn find_by_id(&self, id: &String) -> Result<Option<BridgeTransfer>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn list_by_status(
        &self,
        status: BridgeStatus,
    ) -> Result<Vec<BridgeTransfer>, RepositoryError> {
        self.inner.list_by_status(status).await
    }

    async fn count_by_status(&self, status: BridgeStatus) -> Result<usize, RepositoryError> {
        self.inner.count_by_status(status).await
    }

    async fn remove(&self, id: &String) -> Result<(), RepositoryError> {
        self.inner.remove(id).await
    }
}

struct Fixture {
    coordinator: Arc<BridgeCoordinator>,
    time: Arc<MockTimeSource>,
    repository: Arc<FlakyRepository>,
}

fn fixture() -> Fixture {
    let time = Arc::new(MockTimeSource::new(1_000));
    let repository = Arc::new(FlakyRepository::new());
    let coordinator = Arc::new(BridgeCoordinator::new(
        BridgeConfig::default(),
        repository.clone(),
        Arc::new(AcceptAllProofs),
        time.clone(),
        Arc::new(ObserverBus::new()),
    ));
    Fixture {
        coordinator,
        time,
        repository,
    }
}

fn request(bridge_id: &str, oracles: &[&str], timeout_seconds: u64) -> BridgeTransferRequest {
    BridgeTransferRequest {
        bridge_id: bridge_id.to_string(),
        source_chain: ChainId::Ethereum,
        dest_chain: ChainId::Fabric,
        asset_address: "0xasset".to_string(),
        amount: "12.5".to_string(),
        recipient: "0xrecipient".to_string(),
        source_tx_hash: "0xsource".to_string(),
        lock_proof: vec![0xAA],
        timeout_seconds,
        oracle_set: oracles.iter().map(|o| o.to_string()).collect(),
    }
}

// === INITIATION ===

#[tokio::test]
async fn test_initiate_opens_pending_round() {
    let f = fixture();
    let update = f
        .coordinator
        .initiate_transfer(request("b-1", &["o1", "o2", "o3", "o4"], 3_600))
        .await
        .unwrap();

    assert_eq!(update.status, BridgeStatus::Pending);
    assert_eq!(update.oracle_confirmations, 0);
    assert_eq!(update.required_confirmations, 3);
    assert!(!update.finalized);
    assert!(update.dest_tx_hash.is_none());
}

#[tokio::test]
async fn test_duplicate_bridge_id_rejected_without_state_change() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1"], 3_600))
        .await
        .unwrap();

    let err = f
        .coordinator
        .initiate_transfer(request("b-1", &["o1", "o2"], 60))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::DuplicateBridge(_)));

    // The original round is untouched.
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.required_confirmations, 1);
    assert_eq!(update.status, BridgeStatus::Pending);
}

#[tokio::test]
async fn test_invalid_requests_rejected() {
    let f = fixture();

    let err = f
        .coordinator
        .initiate_transfer(request("", &["o1"], 60))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidRequest(_)));

    let err = f
        .coordinator
        .initiate_transfer(request("b-1", &[], 60))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidRequest(_)));

    let mut bad_amount = request("b-2", &["o1"], 60);
    bad_amount.amount = "not-a-number".to_string();
    let err = f.coordinator.initiate_transfer(bad_amount).await.unwrap_err();
    assert!(matches!(err, BridgeError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_rejected_proof_blocks_initiation() {
    let time = Arc::new(MockTimeSource::new(1_000));
    let coordinator = BridgeCoordinator::new(
        BridgeConfig::default(),
        Arc::new(InMemoryRepository::new()),
        Arc::new(RejectAllProofs),
        time,
        Arc::new(ObserverBus::new()),
    );

    let err = coordinator
        .initiate_transfer(request("b-1", &["o1"], 60))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::ProofRejected(_)));
}

#[tokio::test]
async fn test_persist_failure_surfaces_and_leaves_no_transfer() {
    let f = fixture();
    f.repository.set_fail(true);

    let err = f
        .coordinator
        .initiate_transfer(request("b-1", &["o1"], 60))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Persistence(RepositoryError::Unavailable(_))
    ));

    let err = f.coordinator.get_transfer_status("b-1").await.unwrap_err();
    assert!(matches!(err, BridgeError::UnknownBridge(_)));
}

// === VOTING ===

#[tokio::test]
async fn test_happy_path_to_executed() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1", "o2", "o3", "o4"], 3_600))
        .await
        .unwrap();

    assert!(f.coordinator.submit_vote("b-1", "o1", true, "ok").await.is_none());
    assert!(f.coordinator.submit_vote("b-1", "o2", true, "ok").await.is_none());

    // The third approval is the consensus edge.
    let result = f
        .coordinator
        .submit_vote("b-1", "o3", true, "ok")
        .await
        .expect("consensus result");
    assert_eq!(
        result,
        VerificationResult {
            bridge_id: "b-1".to_string(),
            consensus_reached: true,
            approved_count: 3,
            rejected_count: 0,
        }
    );
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.status, BridgeStatus::Relayed);

    // Execution callbacks: approvals already meet quorum, so the first
    // callback executes and stores its destination hash.
    let update = f
        .coordinator
        .execute_bridge_callback("b-1", "o1", "0xABC")
        .await
        .unwrap();
    assert_eq!(update.status, BridgeStatus::Executed);
    assert_eq!(update.dest_tx_hash.as_deref(), Some("0xABC"));
    assert!(update.finalized);

    // Later callbacks are idempotent and keep the original hash.
    let update = f
        .coordinator
        .execute_bridge_callback("b-1", "o2", "0xDEF")
        .await
        .unwrap();
    assert_eq!(update.status, BridgeStatus::Executed);
    assert_eq!(update.dest_tx_hash.as_deref(), Some("0xABC"));
}

#[tokio::test]
async fn test_single_oracle_threshold_of_one() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1"], 3_600))
        .await
        .unwrap();

    let result = f.coordinator.submit_vote("b-1", "o1", true, "ok").await;
    assert!(result.is_some());
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.status, BridgeStatus::Relayed);
}

#[tokio::test]
async fn test_rejection_after_consensus_does_not_regress() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1", "o2", "o3", "o4"], 3_600))
        .await
        .unwrap();
    for oracle in ["o1", "o2", "o3"] {
        f.coordinator.submit_vote("b-1", oracle, true, "ok").await;
    }

    assert!(f
        .coordinator
        .submit_vote("b-1", "o4", false, "late objection")
        .await
        .is_none());
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.status, BridgeStatus::Relayed);
}

#[tokio::test]
async fn test_revote_overwrites_not_accumulates() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1", "o2", "o3"], 3_600))
        .await
        .unwrap();

    // Flip-flopping one oracle never inflates the tally.
    f.coordinator.submit_vote("b-1", "o1", false, "unsure").await;
    f.coordinator.submit_vote("b-1", "o1", true, "convinced").await;
    f.coordinator.submit_vote("b-1", "o2", true, "ok").await;

    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.oracle_confirmations, 2);
    assert_eq!(update.status, BridgeStatus::Pending);
}

#[tokio::test]
async fn test_unknown_bridge_and_unknown_oracle_ignored() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1"], 3_600))
        .await
        .unwrap();

    assert!(f.coordinator.submit_vote("nope", "o1", true, "ok").await.is_none());
    assert!(f
        .coordinator
        .submit_vote("b-1", "outsider", true, "ok")
        .await
        .is_none());

    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.oracle_confirmations, 0);
}

// === TIMEOUT REFUND ===

#[tokio::test]
async fn test_lazy_refund_is_idempotent() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1", "o2", "o3"], 60))
        .await
        .unwrap();

    f.time.advance(61);
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.status, BridgeStatus::Refunded);
    assert!(update.error.as_deref().unwrap_or("").contains("timeout"));

    // Querying again returns the same terminal state.
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.status, BridgeStatus::Refunded);

    // Votes after refund are ignored.
    assert!(f.coordinator.submit_vote("b-1", "o1", true, "ok").await.is_none());
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.oracle_confirmations, 0);
}

#[tokio::test]
async fn test_query_before_timeout_leaves_status() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1"], 60))
        .await
        .unwrap();

    f.time.advance(60);
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.status, BridgeStatus::Pending);
}

#[tokio::test]
async fn test_refund_persist_failure_reports_unavailable_without_change() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1"], 60))
        .await
        .unwrap();

    f.time.advance(61);
    f.repository.set_fail(true);
    let err = f.coordinator.get_transfer_status("b-1").await.unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Persistence(RepositoryError::Unavailable(_))
    ));

    // Once the store recovers, the refund applies.
    f.repository.set_fail(false);
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.status, BridgeStatus::Refunded);
}

#[tokio::test]
async fn test_settled_transfer_never_refunds() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1"], 60))
        .await
        .unwrap();
    f.coordinator.submit_vote("b-1", "o1", true, "ok").await;
    f.coordinator
        .execute_bridge_callback("b-1", "o1", "0xABC")
        .await
        .unwrap();
    f.coordinator.confirm_settlement("b-1").await.unwrap();

    f.time.advance(3_600);
    let update = f.coordinator.get_transfer_status("b-1").await.unwrap();
    assert_eq!(update.status, BridgeStatus::Settled);
}

#[tokio::test]
async fn test_fail_transfer_from_any_non_terminal() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1"], 60))
        .await
        .unwrap();

    let update = f
        .coordinator
        .fail_transfer("b-1", "source chain reorg")
        .await
        .unwrap();
    assert_eq!(update.status, BridgeStatus::Failed);
    assert_eq!(update.error.as_deref(), Some("source chain reorg"));

    let err = f.coordinator.fail_transfer("b-1", "again").await.unwrap_err();
    assert!(matches!(err, BridgeError::InvalidTransition(_)));
}

// === STREAMS ===

#[tokio::test]
async fn test_verify_stream_pushes_consensus_edge_once() {
    let f = fixture();
    f.coordinator
        .initiate_transfer(request("b-1", &["o1", "o2", "o3"], 3_600))
        .await
        .unwrap();

    let mut session = f.coordinator.open_verify_stream(32);
    for oracle in ["o1", "o2", "o3"] {
        session
            .requests
            .send(OracleVoteMessage {
                bridge_id: "b-1".to_string(),
                oracle_address: oracle.to_string(),
                approved: true,
                reason: "ok".to_string(),
            })
            .await
            .unwrap();
    }

    let result = tokio::time::timeout(Duration::from_secs(1), session.responses.recv())
        .await
        .expect("timeout")
        .expect("result");
    assert!(result.consensus_reached);
    assert_eq!(result.approved_count, 3);
    assert_eq!(result.rejected_count, 0);

    session.cancel.cancel();
}

#[tokio::test]
async fn test_batch_transfers_summary() {
    let f = fixture();
    let (tx, rx) = tokio::sync::mpsc::channel(8);

    let coordinator = f.coordinator.clone();
    let summary = tokio::spawn(async move { coordinator.batch_transfers(rx).await });

    tx.send(request("b-1", &["o1"], 60)).await.unwrap();
    tx.send(request("b-2", &["o1"], 60)).await.unwrap();
    tx.send(request("b-1", &["o1"], 60)).await.unwrap(); // duplicate
    drop(tx);

    let summary = summary.await.unwrap();
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.failed_ids, vec!["b-1".to_string()]);
    assert_eq!(summary.errors.len(), 1);
}

#[tokio::test]
async fn test_pending_stream_filters_by_source_chain() {
    let f = fixture();
    let mut rx = f
        .coordinator
        .stream_pending_transfers(Some(ChainId::Ethereum), 16);

    f.coordinator
        .initiate_transfer(request("b-eth", &["o1"], 60))
        .await
        .unwrap();
    let mut other = request("b-poly", &["o1"], 60);
    other.source_chain = ChainId::Polygon;
    f.coordinator.initiate_transfer(other).await.unwrap();

    let notice = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timeout")
        .expect("notice");
    assert_eq!(notice.bridge_id, "b-eth");

    // The non-matching entry was skipped, not delivered.
    let nothing = tokio::time::timeout(Duration::from_millis(400), rx.recv()).await;
    assert!(nothing.is_err() || nothing.unwrap().is_none());
}

#[tokio::test]
async fn test_monitor_sees_monotonic_status_sequence() {
    let f = fixture();
    let monitor = f.coordinator.monitor_status(vec!["b-1".to_string()], 64);

    f.coordinator
        .initiate_transfer(request("b-1", &["o1"], 3_600))
        .await
        .unwrap();
    f.coordinator.submit_vote("b-1", "o1", true, "ok").await;
    f.coordinator
        .execute_bridge_callback("b-1", "o1", "0xABC")
        .await
        .unwrap();

    let mut statuses = Vec::new();
    while let Some(event) = monitor.next(Duration::from_millis(200)).await {
        if let EventPayload::BridgeStatusChanged { status, .. } = event.payload {
            statuses.push(status);
        }
    }
    assert_eq!(
        statuses,
        vec![
            BridgeStatus::Pending,
            BridgeStatus::Relayed,
            BridgeStatus::Executed
        ]
    );
    monitor.close();
}
