//! Operation tracker driven by the real client against a mocked API.

mod common;

use common::client_for;
use std::sync::Arc;
use std::time::Duration;
use store_console::services::{OperationRegistry, OperationSource, OperationStatus, OperationTracker};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OPERATION: &str = "fileSearchStores/s1/upload/operations/op1";
const OPERATION_PATH: &str = "/v1beta/fileSearchStores/s1/upload/operations/op1";

fn tracker_for(server: &MockServer) -> OperationTracker {
    let source: Arc<dyn OperationSource> = Arc::new(client_for(server));
    OperationTracker::with_interval(source, Duration::from_millis(20))
}

async fn settle(tracker: &OperationTracker) -> store_console::services::TrackerSnapshot {
    tokio::time::timeout(Duration::from_secs(5), tracker.settled())
        .await
        .expect("tracker did not settle")
}

#[tokio::test]
async fn pending_then_done() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OPERATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": OPERATION
        })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(OPERATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": OPERATION,
            "done": true,
            "response": {"documentName": "fileSearchStores/s1/documents/d1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut tracker = tracker_for(&server);
    tracker.watch(OPERATION);
    assert!(tracker.snapshot().is_loading());

    let snapshot = settle(&tracker).await;
    assert_eq!(snapshot.status, OperationStatus::Done);
    assert_eq!(snapshot.polls, 3);
    assert!(snapshot.error.is_none());

    // No further polls once done.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn operation_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OPERATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": OPERATION,
            "done": true,
            "error": {"code": 3, "message": "Unsupported file type"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut tracker = tracker_for(&server);
    tracker.watch(OPERATION);

    let snapshot = settle(&tracker).await;
    assert_eq!(snapshot.status, OperationStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some("Unsupported file type"));
}

#[tokio::test]
async fn failed_fetch_stops_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OPERATION_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": 404, "message": "Operation not found"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut tracker = tracker_for(&server);
    tracker.watch(OPERATION);

    let snapshot = settle(&tracker).await;
    assert_eq!(snapshot.status, OperationStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some("Operation not found"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!tracker.is_polling());
}

#[tokio::test]
async fn registry_cancel_stops_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OPERATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": OPERATION
        })))
        .mount(&server)
        .await;

    let source: Arc<dyn OperationSource> = Arc::new(client_for(&server));
    let registry = OperationRegistry::new(source, Duration::from_millis(20), 10);

    assert_eq!(registry.track(OPERATION).status, OperationStatus::Pending);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(registry.cancel(OPERATION));

    // Let any request already in flight land before counting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let seen = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), seen);
    assert!(registry.snapshot(OPERATION).is_none());
}
