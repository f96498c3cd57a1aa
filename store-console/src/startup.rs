use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use service_core::observability::extract_request_id;
use std::sync::Arc;
use time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{ServerSettings, Settings};
use crate::handlers::{
    app::health_check,
    auth::{login_handler, login_page, logout_handler},
    documents::delete_document_handler,
    metrics::metrics,
    operations::{cancel_operation_handler, operation_status_fragment},
    stores::{create_store_handler, delete_store_handler, list_stores_page, store_detail_page},
    upload::upload_handler,
};
use crate::middleware::auth::auth_middleware;
use crate::services::{ApiError, FileSearchClient, OperationRegistry, OperationSource};
use crate::AppState;

pub const SESSION_COOKIE: &str = "fsg_session";

/// Wire the API client and the operation registry from settings.
pub fn build_state(settings: &Settings) -> Result<AppState, ApiError> {
    let file_search = Arc::new(FileSearchClient::new(settings.file_search.clone())?);
    let source: Arc<dyn OperationSource> = file_search.clone();
    let operations = Arc::new(OperationRegistry::new(
        source,
        settings.operations.poll_interval(),
        settings.operations.retained,
    )
    .with_max_polls(settings.operations.max_polls));

    Ok(AppState::new(file_search, operations, settings.auth.clone()))
}

pub fn build_router(state: AppState, server: &ServerSettings) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)));

    let protected = Router::new()
        .route("/", get(list_stores_page))
        .route("/stores", post(create_store_handler))
        .route("/stores/:id", get(store_detail_page))
        .route("/stores/:id/delete", post(delete_store_handler))
        .route(
            "/stores/:id/documents/:document/delete",
            post(delete_document_handler),
        )
        .route("/stores/:id/upload", post(upload_handler))
        .route("/operations/status", get(operation_status_fragment))
        .route("/operations/cancel", post(cancel_operation_handler))
        .route_layer(from_fn(auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
        // MatchedPath is only available inside the router
        .route_layer(from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes()))
        .layer(session_layer)
        .layer(CompressionLayer::new())
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id =
                    extract_request_id(request.headers()).unwrap_or_else(|| "-".to_string());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the trace span sees the generated id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
