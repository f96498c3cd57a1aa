use service_core::error::AppError;
use thiserror::Error;

/// Failure of a call against the File Search API.
///
/// Every variant displays as a single message fit for showing to the
/// operator. Nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connect, timeout, broken body).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status. `message` is the
    /// service's own `error.message` when it sent one, else `HTTP <status>`.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from File Search API: {0}")]
    Decode(String),

    #[error("Failed to read upload source: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Build the error for a non-success response body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        ApiError::Api { status, message }
    }

    /// Upstream HTTP status, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            ApiError::Io(e) => AppError::InternalError(anyhow::Error::new(e)),
            other => {
                let status = other.status();
                AppError::from_upstream(status, other.to_string())
            }
        }
    }
}
