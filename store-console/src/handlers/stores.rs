use crate::handlers::{page_link, redirect_with, PageQuery};
use crate::models::{format_bytes, Document, FileSearchStore};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

pub(crate) const STORE_PREFIX: &str = "fileSearchStores";

/// Full resource name for a store id taken from the URL.
pub(crate) fn store_resource(id: &str) -> String {
    format!("{}/{}", STORE_PREFIX, id)
}

pub(crate) fn format_time(time: Option<&DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One row of the stores table.
pub struct StoreRow {
    pub id: String,
    pub name: String,
    pub title: String,
    pub active: u64,
    pub pending: u64,
    pub failed: u64,
    pub size: String,
    pub created: String,
    pub updated: String,
}

impl From<&FileSearchStore> for StoreRow {
    fn from(store: &FileSearchStore) -> Self {
        Self {
            id: store.id().to_string(),
            name: store.name.clone(),
            title: store
                .display_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "unnamed".to_string()),
            active: store.active_documents_count,
            pending: store.pending_documents_count,
            failed: store.failed_documents_count,
            size: format_bytes(store.size_bytes),
            created: format_time(store.create_time.as_ref()),
            updated: format_time(store.update_time.as_ref()),
        }
    }
}

pub struct DocumentRow {
    pub id: String,
    pub title: String,
    pub state: String,
    pub state_label: &'static str,
    pub size: String,
    pub mime_type: String,
    pub metadata: Vec<(String, String)>,
    pub created: String,
}

impl From<&Document> for DocumentRow {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id().to_string(),
            title: doc.title().to_string(),
            state: doc.state.as_str().to_ascii_lowercase(),
            state_label: doc.state.label(),
            size: format_bytes(doc.size_bytes),
            mime_type: if doc.mime_type.is_empty() {
                "-".to_string()
            } else {
                doc.mime_type.clone()
            },
            metadata: doc
                .custom_metadata
                .iter()
                .map(|m| (m.key.clone(), m.display_value()))
                .collect(),
            created: format_time(doc.create_time.as_ref()),
        }
    }
}

#[derive(Template)]
#[template(path = "stores.html")]
pub struct StoresTemplate {
    pub current_page: &'static str,
    pub stores: Vec<StoreRow>,
    pub next_page: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "store_detail.html")]
pub struct StoreDetailTemplate {
    pub current_page: &'static str,
    pub store: StoreRow,
    pub documents: Vec<DocumentRow>,
    pub next_page: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoreForm {
    #[validate(length(max = 512, message = "Display name must be at most 512 characters"))]
    pub display_name: Option<String>,
}

/// Form carrying the "force" checkbox. Browsers omit unchecked boxes.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub force: Option<String>,
}

impl DeleteForm {
    pub fn forced(&self) -> bool {
        matches!(self.force.as_deref(), Some("on" | "true" | "1"))
    }
}

pub async fn list_stores_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let mut error = query.error;

    let (stores, next_page) = match state
        .file_search
        .list_stores(query.page_token.as_deref(), None)
        .await
    {
        Ok(page) => (
            page.file_search_stores.iter().map(StoreRow::from).collect(),
            page.next_page_token
                .filter(|t| !t.is_empty())
                .map(|t| page_link("/", &t)),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list stores");
            error = Some(e.to_string());
            (Vec::new(), None)
        }
    };

    StoresTemplate {
        current_page: "stores",
        stores,
        next_page,
        notice: query.notice,
        error,
    }
}

pub async fn create_store_handler(
    State(state): State<AppState>,
    Form(form): Form<CreateStoreForm>,
) -> Redirect {
    if let Err(e) = form.validate() {
        tracing::warn!(error = %e, "Rejected store creation");
        return redirect_with("/", "error", "Display name must be at most 512 characters");
    }

    let display_name = form
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    match state.file_search.create_store(display_name).await {
        Ok(store) => {
            tracing::info!(store = %store.name, "Created store");
            redirect_with("/", "notice", &format!("Created store {}", store.id()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create store");
            redirect_with("/", "error", &e.to_string())
        }
    }
}

pub async fn store_detail_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let name = store_resource(&id);

    let (store, documents) = tokio::join!(
        state.file_search.get_store(&name),
        state
            .file_search
            .list_documents(&name, query.page_token.as_deref()),
    );

    let store = match store {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(store = %name, error = %e, "Failed to load store");
            return redirect_with("/", "error", &e.to_string()).into_response();
        }
    };

    let mut error = query.error;
    let (documents, next_page) = match documents {
        Ok(page) => (
            page.documents.iter().map(DocumentRow::from).collect(),
            page.next_page_token
                .filter(|t| !t.is_empty())
                .map(|t| page_link(&format!("/stores/{}", id), &t)),
        ),
        Err(e) => {
            tracing::error!(store = %name, error = %e, "Failed to list documents");
            error = Some(e.to_string());
            (Vec::new(), None)
        }
    };

    StoreDetailTemplate {
        current_page: "stores",
        store: StoreRow::from(&store),
        documents,
        next_page,
        notice: query.notice,
        error,
    }
    .into_response()
}

pub async fn delete_store_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    let name = store_resource(&id);
    let force = form.forced();

    match state.file_search.delete_store(&name, force).await {
        Ok(()) => {
            tracing::info!(store = %name, force, "Deleted store");
            redirect_with("/", "notice", &format!("Deleted store {}", id))
        }
        Err(e) => {
            tracing::warn!(store = %name, force, error = %e, "Failed to delete store");
            redirect_with("/", "error", &e.to_string())
        }
    }
}
