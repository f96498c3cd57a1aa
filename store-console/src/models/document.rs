use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing state of a document inside a store.
///
/// Unknown wire values and `null` decode as `Unspecified` so new
/// server-side states do not break listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum DocumentState {
    #[default]
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "FAILED")]
    Failed,
}

impl From<Option<String>> for DocumentState {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("PENDING" | "STATE_PENDING") => DocumentState::Pending,
            Some("ACTIVE" | "STATE_ACTIVE") => DocumentState::Active,
            Some("FAILED" | "STATE_FAILED") => DocumentState::Failed,
            _ => DocumentState::Unspecified,
        }
    }
}

impl DocumentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentState::Unspecified => "STATE_UNSPECIFIED",
            DocumentState::Pending => "PENDING",
            DocumentState::Active => "ACTIVE",
            DocumentState::Failed => "FAILED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentState::Unspecified => "Unknown",
            DocumentState::Pending => "Processing",
            DocumentState::Active => "Active",
            DocumentState::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringList {
    #[serde(default)]
    pub values: Vec<String>,
}

/// User-supplied key/value pair attached to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetadata {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_list_value: Option<StringList>,
}

impl CustomMetadata {
    pub fn display_value(&self) -> String {
        if let Some(s) = &self.string_value {
            s.clone()
        } else if let Some(n) = self.numeric_value {
            n.to_string()
        } else if let Some(list) = &self.string_list_value {
            list.values.join(", ")
        } else {
            String::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Resource name, e.g. `fileSearchStores/abc/documents/def`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub custom_metadata: Vec<CustomMetadata>,
    #[serde(default)]
    pub state: DocumentState,
    #[serde(default, deserialize_with = "super::int64::deserialize")]
    pub size_bytes: u64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    pub fn id(&self) -> &str {
        super::short_id(&self.name)
    }

    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.id())
    }
}

/// One page of documents in a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}
