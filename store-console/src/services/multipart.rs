//! `multipart/related` body for File Search uploads.
//!
//! One request carries two parts: the JSON metadata (display name, chunking)
//! followed by the raw file bytes. The boundary is random and is not checked
//! against the content; a collision is improbable enough to ignore.
//!
//! The whole file is held in memory. There is no streaming or resumable
//! variant.

use crate::models::UploadMetadata;
use crate::services::ApiError;
use rand::{distributions::Alphanumeric, Rng};
use std::path::Path;

pub const BOUNDARY_PREFIX: &str = "----MultipartBoundary";

/// MIME type used for the file part when the caller does not know better.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const BOUNDARY_RANDOM_LEN: usize = 24;

/// An encoded upload body together with its boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

/// Fresh random boundary.
pub fn generate_boundary() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", BOUNDARY_PREFIX, suffix)
}

/// Encode file content and metadata with a fresh boundary.
pub fn encode(
    metadata: &UploadMetadata,
    mime_type: Option<&str>,
    content: &[u8],
) -> Result<MultipartBody, ApiError> {
    encode_with_boundary(generate_boundary(), metadata, mime_type, content)
}

/// Read `path` once and encode it. Fails before anything is sent if the file
/// cannot be read.
pub async fn encode_file(
    path: &Path,
    metadata: &UploadMetadata,
    mime_type: Option<&str>,
) -> Result<MultipartBody, ApiError> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Failed to read upload source");
        ApiError::Io(e)
    })?;

    encode(metadata, mime_type, &content)
}

pub(crate) fn encode_with_boundary(
    boundary: String,
    metadata: &UploadMetadata,
    mime_type: Option<&str>,
    content: &[u8],
) -> Result<MultipartBody, ApiError> {
    let metadata_json = serde_json::to_string(metadata)
        .map_err(|e| ApiError::Validation(format!("Invalid upload metadata: {}", e)))?;
    let mime_type = mime_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE);

    let header = format!(
        "--{b}\r\nContent-Type: application/json; charset=utf-8\r\n\r\n{json}\r\n--{b}\r\nContent-Type: {mime}\r\n\r\n",
        b = boundary,
        json = metadata_json,
        mime = mime_type,
    );
    let footer = format!("\r\n--{}--", boundary);

    let mut body = Vec::with_capacity(header.len() + content.len() + footer.len());
    body.extend_from_slice(header.as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(footer.as_bytes());

    Ok(MultipartBody { boundary, body })
}
