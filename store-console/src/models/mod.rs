//! Resource shapes of the File Search REST API.
//!
//! Field names follow the wire format (camelCase). Counters and sizes are
//! int64 on the wire and may arrive as JSON strings; absent means zero.

pub mod document;
pub mod operation;
pub mod store;
pub mod upload;

pub use document::{CustomMetadata, Document, DocumentState, ListDocumentsResponse};
pub use operation::{Operation, OperationError};
pub use store::{format_bytes, short_id, FileSearchStore, ListStoresResponse};
pub use upload::{ChunkingConfig, UploadMetadata};

/// Lenient decoding for int64 fields.
pub(crate) mod int64 {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(0),
            Some(Raw::Number(n)) => Ok(n),
            Some(Raw::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}
