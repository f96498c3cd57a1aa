use serde::{Deserialize, Serialize};

/// Error payload carried by a finished operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// A long-running operation, e.g. the processing of an uploaded file.
///
/// Only ever re-fetched by the client, never modified. Once `done` is true the
/// operation does not change again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Operation {
    /// Message describing a failed operation, if it failed.
    pub fn failure_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| {
            if e.message.is_empty() {
                format!("Operation failed with code {}", e.code)
            } else {
                e.message.clone()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_operation_defaults() {
        let op: Operation =
            serde_json::from_str(r#"{"name": "fileSearchStores/s/upload/operations/o1"}"#).unwrap();
        assert!(!op.done);
        assert!(op.error.is_none());
        assert!(op.failure_message().is_none());
    }

    #[test]
    fn test_failed_operation_message() {
        let op: Operation = serde_json::from_str(
            r#"{"name": "ops/1", "done": true, "error": {"code": 3, "message": "unsupported file"}}"#,
        )
        .unwrap();
        assert_eq!(op.failure_message().as_deref(), Some("unsupported file"));
    }

    #[test]
    fn test_failed_operation_without_message() {
        let op: Operation =
            serde_json::from_str(r#"{"name": "ops/1", "done": true, "error": {"code": 13}}"#)
                .unwrap();
        assert_eq!(
            op.failure_message().as_deref(),
            Some("Operation failed with code 13")
        );
    }
}
