#![allow(dead_code)]

use secrecy::Secret;
use store_console::config::{
    AuthSettings, FileSearchSettings, OperationSettings, ServerSettings, Settings,
    TelemetrySettings,
};
use store_console::services::FileSearchClient;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-key";
pub const TEST_USERNAME: &str = "operator";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Client settings pointing at a mock File Search API.
pub fn file_search_settings(base: &str) -> FileSearchSettings {
    FileSearchSettings {
        api_base_url: format!("{}/v1beta", base),
        upload_base_url: format!("{}/upload/v1beta", base),
        api_key: Secret::new(TEST_API_KEY.to_string()),
        document_page_size: 20,
        request_timeout_secs: 5,
    }
}

pub fn client_for(server: &MockServer) -> FileSearchClient {
    FileSearchClient::new(file_search_settings(&server.uri())).expect("Failed to build client")
}

pub fn settings_for(base: &str, auth: AuthSettings) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            secure_cookies: false,
            max_upload_mb: 10,
        },
        auth,
        file_search: file_search_settings(base),
        operations: OperationSettings {
            poll_interval_ms: 20,
            retained: 10,
            max_polls: 100,
        },
        telemetry: TelemetrySettings::default(),
    }
}

pub fn operator_auth() -> AuthSettings {
    AuthSettings {
        username: Some(TEST_USERNAME.to_string()),
        password: Some(Secret::new(TEST_PASSWORD.to_string())),
    }
}

/// Base URL of a port nothing is listening on.
pub async fn unreachable_base() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn store_json(id: &str, display_name: Option<&str>) -> serde_json::Value {
    let mut store = serde_json::json!({
        "name": format!("fileSearchStores/{}", id),
        "createTime": "2025-03-01T10:00:00Z",
        "activeDocumentsCount": "2",
        "pendingDocumentsCount": "0",
        "failedDocumentsCount": "1",
        "sizeBytes": "4096"
    });
    if let Some(name) = display_name {
        store["displayName"] = serde_json::json!(name);
    }
    store
}
