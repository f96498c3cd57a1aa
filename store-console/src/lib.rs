pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use config::AuthSettings;
use services::{FileSearchClient, OperationRegistry};
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub file_search: Arc<FileSearchClient>,
    pub operations: Arc<OperationRegistry>,
    pub auth: Arc<AuthSettings>,
}

impl AppState {
    pub fn new(
        file_search: Arc<FileSearchClient>,
        operations: Arc<OperationRegistry>,
        auth: AuthSettings,
    ) -> Self {
        Self {
            file_search,
            operations,
            auth: Arc::new(auth),
        }
    }
}
