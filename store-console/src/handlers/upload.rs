use crate::handlers::error_fragment;
use crate::handlers::operations::OperationStatusTemplate;
use crate::handlers::stores::store_resource;
use crate::models::{ChunkingConfig, UploadMetadata};
use crate::services::multipart;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::Validate;

/// Chunking fields from the upload form, once parsed.
#[derive(Debug, Default, Validate)]
pub struct ChunkingForm {
    #[validate(range(min = 100, max = 8192, message = "Chunk size must be between 100 and 8192"))]
    pub chunk_size: Option<u32>,
    #[validate(range(max = 1000, message = "Chunk overlap must be between 0 and 1000"))]
    pub chunk_overlap: Option<u32>,
}

impl ChunkingForm {
    pub fn parse(chunk_size: Option<&str>, chunk_overlap: Option<&str>) -> Result<Self, String> {
        Ok(Self {
            chunk_size: parse_number(chunk_size, "Chunk size")?,
            chunk_overlap: parse_number(chunk_overlap, "Chunk overlap")?,
        })
    }

    /// No size means service defaults; overlap alone is ignored.
    pub fn into_config(self) -> Option<ChunkingConfig> {
        self.chunk_size.map(|size| ChunkingConfig {
            chunk_size: Some(size),
            chunk_overlap: Some(self.chunk_overlap.unwrap_or(0)),
        })
    }
}

fn parse_number(value: Option<&str>, field: &str) -> Result<Option<u32>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<u32>()
            .map(Some)
            .map_err(|_| format!("{} must be a whole number", field)),
    }
}

fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid chunking settings".to_string())
}

struct UploadForm {
    file_name: Option<String>,
    mime_type: Option<String>,
    content: Option<Vec<u8>>,
    display_name: Option<String>,
    chunk_size: Option<String>,
    chunk_overlap: Option<String>,
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, String> {
    let mut form = UploadForm {
        file_name: None,
        mime_type: None,
        content: None,
        display_name: None,
        chunk_size: None,
        chunk_overlap: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read upload: {}", e))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.mime_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file: {}", e))?;
                form.content = Some(data.to_vec());
            }
            "display_name" | "chunk_size" | "chunk_overlap" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| format!("Failed to read {}: {}", field_name, e))?;
                match field_name.as_str() {
                    "display_name" => form.display_name = Some(text),
                    "chunk_size" => form.chunk_size = Some(text),
                    _ => form.chunk_overlap = Some(text),
                }
            }
            other => tracing::debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    Ok(form)
}

pub async fn upload_handler(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    mut form_data: Multipart,
) -> Response {
    let store_name = store_resource(&store_id);

    let form = match read_form(&mut form_data).await {
        Ok(form) => form,
        Err(message) => {
            tracing::warn!(store = %store_name, error = %message, "Malformed upload form");
            return error_fragment(StatusCode::BAD_REQUEST, &message);
        }
    };

    // A browser submits an empty, unnamed part when no file was picked.
    let picked = form.file_name.as_deref().is_some_and(|n| !n.is_empty());
    let content = match form.content {
        Some(content) if picked || !content.is_empty() => content,
        _ => return error_fragment(StatusCode::BAD_REQUEST, "Select a file to upload"),
    };

    let chunking = match ChunkingForm::parse(
        form.chunk_size.as_deref(),
        form.chunk_overlap.as_deref(),
    ) {
        Ok(chunking) => chunking,
        Err(message) => return error_fragment(StatusCode::BAD_REQUEST, &message),
    };
    if let Err(e) = chunking.validate() {
        return error_fragment(StatusCode::BAD_REQUEST, &first_validation_message(&e));
    }

    let metadata = UploadMetadata {
        display_name: form
            .display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        chunking_config: chunking.into_config(),
    };

    let body = match multipart::encode(&metadata, form.mime_type.as_deref(), &content) {
        Ok(body) => body,
        Err(e) => return error_fragment(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let operation = match state.file_search.upload_file(&store_name, body).await {
        Ok(operation) => operation,
        Err(e) => {
            tracing::error!(store = %store_name, error = %e, "Upload failed");
            return error_fragment(StatusCode::BAD_GATEWAY, &e.to_string());
        }
    };

    tracing::info!(
        store = %store_name,
        operation = %operation.name,
        file = form.file_name.as_deref().unwrap_or("-"),
        "Tracking upload"
    );

    let snapshot = state.operations.track(&operation.name);
    OperationStatusTemplate::from_snapshot(&snapshot).into_response()
}
