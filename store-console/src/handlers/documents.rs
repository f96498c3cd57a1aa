use crate::handlers::redirect_with;
use crate::handlers::stores::{store_resource, DeleteForm};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Redirect,
    Form,
};

pub async fn delete_document_handler(
    State(state): State<AppState>,
    Path((store_id, document_id)): Path<(String, String)>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    let name = format!("{}/documents/{}", store_resource(&store_id), document_id);
    let back = format!("/stores/{}", store_id);
    let force = form.forced();

    match state.file_search.delete_document(&name, force).await {
        Ok(()) => {
            tracing::info!(document = %name, force, "Deleted document");
            redirect_with(&back, "notice", &format!("Deleted document {}", document_id))
        }
        Err(e) => {
            // Non-empty documents need force; the service says so in its message.
            tracing::warn!(document = %name, force, error = %e, "Failed to delete document");
            redirect_with(&back, "error", &e.to_string())
        }
    }
}
