use crate::services::{OperationStatus, TrackerSnapshot};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct OperationQuery {
    pub name: String,
}

impl OperationQuery {
    fn validated(&self) -> Result<&str, AppError> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(AppError::BadRequest(anyhow::anyhow!("Invalid operation name")));
        }
        Ok(name)
    }
}

/// Upload progress fragment. While `loading` it re-requests itself.
#[derive(Template)]
#[template(path = "fragments/operation_status.html")]
pub struct OperationStatusTemplate {
    pub name: Option<String>,
    pub status: &'static str,
    pub label: &'static str,
    pub loading: bool,
    pub error: Option<String>,
    pub document: Option<String>,
    pub poll_url: String,
    pub cancel_url: String,
}

impl OperationStatusTemplate {
    pub fn from_snapshot(snapshot: &TrackerSnapshot) -> Self {
        let query = snapshot
            .name
            .as_deref()
            .and_then(|name| serde_urlencoded::to_string([("name", name)]).ok())
            .unwrap_or_default();

        let document = snapshot
            .operation
            .as_ref()
            .filter(|_| snapshot.status == OperationStatus::Done)
            .and_then(|op| op.response.as_ref())
            .and_then(|r| r.get("documentName"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Self {
            name: snapshot.name.clone(),
            status: snapshot.status.as_str(),
            label: snapshot.status.label(),
            loading: snapshot.is_loading(),
            error: snapshot.error.clone(),
            document,
            poll_url: format!("/operations/status?{}", query),
            cancel_url: format!("/operations/cancel?{}", query),
        }
    }

    pub fn idle() -> Self {
        Self {
            name: None,
            status: OperationStatus::Idle.as_str(),
            label: OperationStatus::Idle.label(),
            loading: false,
            error: None,
            document: None,
            poll_url: String::new(),
            cancel_url: String::new(),
        }
    }
}

pub async fn operation_status_fragment(
    State(state): State<AppState>,
    Query(query): Query<OperationQuery>,
) -> Result<Response, AppError> {
    let name = query.validated()?;

    // Unknown names (e.g. after a restart) start being tracked again.
    let snapshot = match state.operations.snapshot(name) {
        Some(snapshot) => snapshot,
        None => state.operations.track(name),
    };

    Ok(OperationStatusTemplate::from_snapshot(&snapshot).into_response())
}

pub async fn cancel_operation_handler(
    State(state): State<AppState>,
    Query(query): Query<OperationQuery>,
) -> Result<Response, AppError> {
    let name = query.validated()?;

    if !state.operations.cancel(name) {
        tracing::debug!(operation = %name, "Cancel requested for untracked operation");
    }

    Ok(OperationStatusTemplate::idle().into_response())
}
