//! HTTP implementation of the storage collaborators.
//!
//! Talks to the remote backend over four endpoints: the upload-URL
//! mutation, the direct blob write, the metadata insert mutation, and the
//! metadata list / URL-resolution queries. One shared client with a
//! connection timeout serves every call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::store::{
    AssetId, BlobStore, ImageRecord, MetadataStore, NewImageRecord, StorageId, StoreError,
    StoreResult,
};

/// Timeout applied to every backend request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the remote backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend deployment, e.g. `https://api.example.dev`.
    pub base_url: String,
    /// Optional bearer token attached to every request.
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// HTTP-backed implementation of [`BlobStore`] and [`MetadataStore`].
pub struct HttpBackend {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Request(format!("HTTP {status}: {body}")));
        }
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobWriteResponse {
    storage_id: StorageId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertResponse {
    id: AssetId,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    url: Option<String>,
}

#[async_trait]
impl BlobStore for HttpBackend {
    async fn generate_upload_url(&self) -> StoreResult<String> {
        let response = self
            .with_auth(self.client.post(self.url("/storage/upload-url")))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let parsed: UploadUrlResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        Ok(parsed.upload_url)
    }

    async fn write_blob(
        &self,
        upload_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StoreResult<StorageId> {
        // The upload target is absolute and single-use; no auth header
        let response = self
            .client
            .post(upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let parsed: BlobWriteResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        Ok(parsed.storage_id)
    }

    async fn resolve_url(&self, storage_id: &StorageId) -> StoreResult<Option<String>> {
        let response = self
            .with_auth(
                self.client
                    .get(self.url(&format!("/storage/{}/url", storage_id.as_str()))),
            )
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        // A vanished blob is data, not an error
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;

        let parsed: ResolveResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        Ok(parsed.url)
    }
}

#[async_trait]
impl MetadataStore for HttpBackend {
    async fn insert(&self, record: NewImageRecord) -> StoreResult<AssetId> {
        let response = self
            .with_auth(self.client.post(self.url("/images")))
            .json(&record)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let parsed: InsertResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        Ok(parsed.id)
    }

    async fn list(&self) -> StoreResult<Vec<ImageRecord>> {
        let response = self
            .with_auth(self.client.get(self.url("/images")))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}
