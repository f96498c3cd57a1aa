//! File Search client against a mocked remote API.

mod common;

use common::{client_for, store_json, unreachable_base, TEST_API_KEY};
use store_console::models::{ChunkingConfig, DocumentState, UploadMetadata};
use store_console::services::{multipart, ApiError, FileSearchClient};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn has_param(req: &Request, key: &str) -> bool {
    req.url.query_pairs().any(|(k, _)| k == key)
}

#[tokio::test]
async fn list_stores_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/fileSearchStores"))
        .and(query_param("key", TEST_API_KEY))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fileSearchStores": [store_json("a1", Some("Contracts")), store_json("b2", None)],
            "nextPageToken": "next"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .list_stores(None, Some(10))
        .await
        .expect("list should succeed");

    assert_eq!(page.file_search_stores.len(), 2);
    assert_eq!(page.file_search_stores[0].title(), "Contracts");
    assert_eq!(page.file_search_stores[1].active_documents_count, 2);
    assert_eq!(page.file_search_stores[1].size_bytes, 4096);
    assert_eq!(page.next_page_token.as_deref(), Some("next"));
}

#[tokio::test]
async fn list_all_stores_follows_tokens_without_repeats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/fileSearchStores"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fileSearchStores": [store_json("c3", None)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/fileSearchStores"))
        .and(|req: &Request| !has_param(req, "pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fileSearchStores": [store_json("a1", None), store_json("b2", None)],
            "nextPageToken": "p2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stores = client_for(&server)
        .list_all_stores()
        .await
        .expect("listing should succeed");

    let ids: Vec<&str> = stores.iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec!["a1", "b2", "c3"]);
}

#[tokio::test]
async fn create_store_sends_display_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/fileSearchStores"))
        .and(body_json(serde_json::json!({"displayName": "Manuals"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_json("m1", Some("Manuals"))))
        .expect(1)
        .mount(&server)
        .await;

    let store = client_for(&server)
        .create_store(Some("Manuals"))
        .await
        .expect("create should succeed");
    assert_eq!(store.name, "fileSearchStores/m1");
}

#[tokio::test]
async fn create_store_without_name_sends_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/fileSearchStores"))
        .and(body_json(serde_json::json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_json("x9", None)))
        .expect(1)
        .mount(&server)
        .await;

    let store = client_for(&server).create_store(None).await.unwrap();
    assert_eq!(store.title(), "x9");
}

#[tokio::test]
async fn api_error_message_is_propagated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/fileSearchStores/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": 404, "message": "Store not found", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_store("fileSearchStores/missing")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Store not found");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn non_json_error_uses_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/fileSearchStores/s1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_store("fileSearchStores/s1")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 502");
}

#[tokio::test]
async fn delete_without_force_propagates_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/fileSearchStores/full"))
        .and(|req: &Request| !has_param(req, "force"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": 400, "message": "Cannot delete non-empty store without force"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .delete_store("fileSearchStores/full", false)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Api { status: 400, .. }));
    assert_eq!(err.to_string(), "Cannot delete non-empty store without force");
}

#[tokio::test]
async fn forced_delete_sends_force_true() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/fileSearchStores/full"))
        .and(query_param("force", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .delete_store("fileSearchStores/full", true)
        .await
        .expect("forced delete should succeed");
}

#[tokio::test]
async fn list_documents_uses_configured_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/fileSearchStores/s1/documents"))
        .and(query_param("pageSize", "20"))
        .and(query_param("pageToken", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "documents": [
                {"name": "fileSearchStores/s1/documents/d1", "state": "STATE_ACTIVE", "sizeBytes": "10"},
                {"name": "fileSearchStores/s1/documents/d2", "state": "STATE_SOMETHING_NEW"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .list_documents("fileSearchStores/s1", Some("tok"))
        .await
        .unwrap();

    assert_eq!(page.documents.len(), 2);
    assert_eq!(page.documents[0].state, DocumentState::Active);
    assert_eq!(page.documents[1].state, DocumentState::Unspecified);
    assert!(page.next_page_token.is_none());
}

#[tokio::test]
async fn upload_posts_multipart_related_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/fileSearchStores/s1:uploadToFileSearchStore"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "fileSearchStores/s1/upload/operations/op1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = UploadMetadata {
        display_name: Some("doc1".to_string()),
        chunking_config: Some(ChunkingConfig {
            chunk_size: Some(512),
            chunk_overlap: Some(0),
        }),
    };
    let body = multipart::encode(&metadata, Some("text/plain"), b"hello").unwrap();
    let boundary = body.boundary().to_string();

    let operation = client_for(&server)
        .upload_file("fileSearchStores/s1", body)
        .await
        .expect("upload should succeed");
    assert_eq!(operation.name, "fileSearchStores/s1/upload/operations/op1");
    assert!(!operation.done);

    let requests = server.received_requests().await.unwrap();
    let sent = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(sent.starts_with(&format!("--{}\r\n", boundary)));
    assert!(sent.contains(r#""displayName":"doc1""#));
    assert!(sent.contains(r#""chunkSize":512"#));
    assert!(sent.contains("Content-Type: text/plain\r\n\r\nhello\r\n"));
    assert!(sent.ends_with(&format!("--{}--", boundary)));
}

#[tokio::test]
async fn upload_path_fails_before_sending_when_unreadable() {
    let server = MockServer::start().await;

    let err = client_for(&server)
        .upload_path(
            "fileSearchStores/s1",
            std::path::Path::new("does/not/exist.pdf"),
            &UploadMetadata::default(),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Io(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn transport_error_does_not_leak_key() {
    let base = unreachable_base().await;
    let client = FileSearchClient::new(common::file_search_settings(&base)).unwrap();

    let err = client.list_stores(None, None).await.unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().starts_with("Network error"));
    assert!(!err.to_string().contains(TEST_API_KEY));
}
