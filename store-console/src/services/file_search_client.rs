//! File Search REST API client.
//!
//! One method per remote action. The API key comes from the settings the
//! client was built with and is appended to every call; the client never
//! looks at the operator's console session.

use crate::config::FileSearchSettings;
use crate::models::{
    Document, FileSearchStore, ListDocumentsResponse, ListStoresResponse, Operation,
    UploadMetadata,
};
use crate::services::metrics::record_api_call;
use crate::services::multipart::{self, MultipartBody};
use crate::services::operation_tracker::OperationSource;
use crate::services::ApiError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use service_core::observability::TracedRequestExt;
use std::path::Path;

const STORES_COLLECTION: &str = "fileSearchStores";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateStoreRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
}

/// Client for the File Search stores, documents and operations endpoints.
#[derive(Clone)]
pub struct FileSearchClient {
    client: Client,
    settings: FileSearchSettings,
}

impl FileSearchClient {
    pub fn new(settings: FileSearchSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &FileSearchSettings {
        &self.settings
    }

    /// List one page of stores. `None` token means the first page.
    pub async fn list_stores(
        &self,
        page_token: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<ListStoresResponse, ApiError> {
        let page_size = page_size.map(|s| s.to_string());
        let mut params = Vec::new();
        if let Some(size) = page_size.as_deref() {
            params.push(("pageSize", size));
        }
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            params.push(("pageToken", token));
        }

        let url = self.resource_url(STORES_COLLECTION, &params)?;
        self.execute("list_stores", self.client.get(url)).await
    }

    /// Follow `nextPageToken` until the last page and return every store.
    pub async fn list_all_stores(&self) -> Result<Vec<FileSearchStore>, ApiError> {
        let mut stores = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.list_stores(token.as_deref(), None).await?;
            stores.extend(page.file_search_stores);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(stores)
    }

    pub async fn create_store(
        &self,
        display_name: Option<&str>,
    ) -> Result<FileSearchStore, ApiError> {
        let url = self.resource_url(STORES_COLLECTION, &[])?;
        let body = CreateStoreRequest {
            display_name: display_name.filter(|n| !n.is_empty()),
        };

        let store: FileSearchStore = self
            .execute("create_store", self.client.post(url).json(&body))
            .await?;

        tracing::info!(store = %store.name, "File search store created");
        Ok(store)
    }

    pub async fn get_store(&self, name: &str) -> Result<FileSearchStore, ApiError> {
        let url = self.resource_url(name, &[])?;
        self.execute("get_store", self.client.get(url)).await
    }

    /// Delete a store. With `force` the service also deletes its documents;
    /// without it, deleting a non-empty store fails with the service's message.
    pub async fn delete_store(&self, name: &str, force: bool) -> Result<(), ApiError> {
        let url = self.resource_url(name, force_param(force))?;
        self.send("delete_store", self.client.delete(url)).await?;

        tracing::info!(store = %name, force, "File search store deleted");
        Ok(())
    }

    /// List one page of documents in a store, `document_page_size` at a time.
    pub async fn list_documents(
        &self,
        store_name: &str,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse, ApiError> {
        let page_size = self.settings.document_page_size.to_string();
        let mut params = vec![("pageSize", page_size.as_str())];
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            params.push(("pageToken", token));
        }

        let url = self.resource_url(&format!("{}/documents", store_name), &params)?;
        self.execute("list_documents", self.client.get(url)).await
    }

    pub async fn get_document(&self, name: &str) -> Result<Document, ApiError> {
        let url = self.resource_url(name, &[])?;
        self.execute("get_document", self.client.get(url)).await
    }

    pub async fn delete_document(&self, name: &str, force: bool) -> Result<(), ApiError> {
        let url = self.resource_url(name, force_param(force))?;
        self.send("delete_document", self.client.delete(url)).await?;

        tracing::info!(document = %name, force, "Document deleted");
        Ok(())
    }

    /// Submit an encoded upload. The returned operation tracks processing.
    pub async fn upload_file(
        &self,
        store_name: &str,
        body: MultipartBody,
    ) -> Result<Operation, ApiError> {
        let url = self.upload_url(store_name)?;
        let size = body.len();

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, body.content_type())
            .body(body.into_bytes());

        let operation: Operation = self.execute("upload_file", request).await?;

        tracing::info!(
            store = %store_name,
            operation = %operation.name,
            bytes = size,
            "Upload accepted"
        );
        Ok(operation)
    }

    /// Read a local file and upload it. Nothing is sent if the read fails.
    pub async fn upload_path(
        &self,
        store_name: &str,
        path: &Path,
        metadata: &UploadMetadata,
        mime_type: Option<&str>,
    ) -> Result<Operation, ApiError> {
        let body = multipart::encode_file(path, metadata, mime_type).await?;
        self.upload_file(store_name, body).await
    }

    pub async fn get_operation(&self, name: &str) -> Result<Operation, ApiError> {
        let url = self.resource_url(name, &[])?;
        self.execute("get_operation", self.client.get(url)).await
    }

    fn resource_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        self.build_url(&self.settings.api_base_url, path, params)
    }

    fn upload_url(&self, store_name: &str) -> Result<Url, ApiError> {
        self.build_url(
            &self.settings.upload_base_url,
            &format!("{}:uploadToFileSearchStore", store_name),
            &[("uploadType", "multipart")],
        )
    }

    fn build_url(&self, base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::Validation(format!("Invalid resource name '{}': {}", path, e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", self.settings.api_key.expose_secret());
            for (k, v) in params {
                query.append_pair(k, v);
            }
        }

        Ok(url)
    }

    /// Send a request and decode a JSON resource from the success body.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(operation, request).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(operation, error = %e, "Failed to decode File Search response");
            ApiError::Decode(e.to_string())
        })
    }

    /// Send a request and turn any non-success status into `ApiError::Api`.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        tracing::debug!(operation, "Calling File Search API");

        let response = match request.with_trace_context().send().await {
            Ok(response) => response,
            Err(e) => {
                record_api_call(operation, "transport_error");
                tracing::warn!(operation, error = %e, "File Search API unreachable");
                return Err(ApiError::Transport(e.without_url()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = ApiError::from_response(status.as_u16(), &body);
            record_api_call(operation, "api_error");
            tracing::warn!(
                operation,
                status = status.as_u16(),
                error = %err,
                "File Search API returned an error"
            );
            return Err(err);
        }

        record_api_call(operation, "ok");
        Ok(response)
    }
}

fn force_param(force: bool) -> &'static [(&'static str, &'static str)] {
    if force {
        &[("force", "true")]
    } else {
        &[]
    }
}

#[async_trait]
impl OperationSource for FileSearchClient {
    async fn get_operation(&self, name: &str) -> Result<Operation, ApiError> {
        FileSearchClient::get_operation(self, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn client() -> FileSearchClient {
        FileSearchClient::new(FileSearchSettings {
            api_base_url: "https://api.example.test/v1beta/".to_string(),
            upload_base_url: "https://api.example.test/upload/v1beta".to_string(),
            api_key: Secret::new("k3y".to_string()),
            document_page_size: 20,
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_resource_url_carries_key_and_params() {
        let url = client()
            .resource_url("fileSearchStores/abc", &[("force", "true")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.test/v1beta/fileSearchStores/abc?key=k3y&force=true"
        );
    }

    #[test]
    fn test_upload_url() {
        let url = client().upload_url("fileSearchStores/abc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.test/upload/v1beta/fileSearchStores/abc:uploadToFileSearchStore?key=k3y&uploadType=multipart"
        );
    }

    #[test]
    fn test_force_param_only_when_forced() {
        assert!(force_param(false).is_empty());
        assert_eq!(force_param(true), &[("force", "true")]);
    }
}
