pub mod error;
pub mod file_search_client;
pub mod metrics;
pub mod multipart;
pub mod operation_tracker;
pub mod operations;

pub use error::ApiError;
pub use file_search_client::FileSearchClient;
pub use multipart::MultipartBody;
pub use operation_tracker::{OperationSource, OperationStatus, OperationTracker, TrackerSnapshot};
pub use operations::OperationRegistry;
