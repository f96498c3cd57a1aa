use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;
use std::time::Duration;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    pub file_search: FileSearchSettings,
    #[serde(default)]
    pub operations: OperationSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`. Enable when served over HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    /// Largest accepted upload request, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_max_upload_mb() -> usize {
    100
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// The single operator account guarding the console.
///
/// Both values unset means login is impossible and the login form reports a
/// server-side misconfiguration.
#[derive(Deserialize, Clone, Default)]
pub struct AuthSettings {
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
}

#[derive(Deserialize, Clone)]
pub struct FileSearchSettings {
    /// Base URL for resource calls.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL for media uploads.
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,
    /// API key appended to every call as `key=`.
    pub api_key: Secret<String>,
    /// `pageSize` sent when listing documents.
    #[serde(default = "default_document_page_size")]
    pub document_page_size: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_upload_base_url() -> String {
    "https://generativelanguage.googleapis.com/upload/v1beta".to_string()
}

fn default_document_page_size() -> u32 {
    20
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl FileSearchSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Deserialize, Clone)]
pub struct OperationSettings {
    /// Delay between two polls of the same operation.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Trackers kept at most; finished ones go first, then the oldest.
    #[serde(default = "default_retained_operations")]
    pub retained: usize,
    /// Unfinished polls before a tracker gives up with an error.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_retained_operations() -> usize {
    100
}

fn default_max_polls() -> u32 {
    crate::services::operation_tracker::DEFAULT_MAX_POLLS
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            retained: default_retained_operations(),
            max_polls: default_max_polls(),
        }
    }
}

impl OperationSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC endpoint; span export is disabled when unset.
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let configuration_directory = service_core::config::configuration_directory("store-console")?;
    service_core::config::load_settings(&configuration_directory)
}
