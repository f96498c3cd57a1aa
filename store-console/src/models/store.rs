use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A File Search store as returned by the remote service.
///
/// The three counters are maintained server-side and displayed as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSearchStore {
    /// Resource name, e.g. `fileSearchStores/abc123`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::int64::deserialize")]
    pub active_documents_count: u64,
    #[serde(default, deserialize_with = "super::int64::deserialize")]
    pub pending_documents_count: u64,
    #[serde(default, deserialize_with = "super::int64::deserialize")]
    pub failed_documents_count: u64,
    #[serde(default, deserialize_with = "super::int64::deserialize")]
    pub size_bytes: u64,
}

impl FileSearchStore {
    /// Trailing segment of the resource name.
    pub fn id(&self) -> &str {
        short_id(&self.name)
    }

    /// Display name, falling back to the id.
    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.id())
    }
}

/// One page of stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStoresResponse {
    #[serde(default)]
    pub file_search_stores: Vec<FileSearchStore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Last `/`-separated segment of a resource name.
pub fn short_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Human-readable byte size using 1024 steps (`1.5 KB`, `0 B`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
