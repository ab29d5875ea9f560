//! Collaborator traits for the storage backend.
//!
//! The backend exposes two concerns: blob storage (one-time upload targets,
//! direct binary writes, URL resolution) and a metadata document store.
//! Both are modelled as object-safe async traits so the gateway can run
//! against the HTTP backend in production and in-memory fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle to an uploaded binary object, assigned by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageId(pub String);

impl StorageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// System-assigned identity of a metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A persisted image asset record.
///
/// Created exactly once per successful raster export; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: AssetId,
    pub storage_id: StorageId,
    /// Original filename, display-only.
    pub name: String,
    /// Export format string ("jpeg" | "png").
    pub format: String,
    /// Owning user, when the backend attributes the record to one.
    /// This flow never writes it; it only round-trips on reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ref: Option<String>,
}

/// Input for a metadata insert; the store assigns the record identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImageRecord {
    pub storage_id: StorageId,
    pub name: String,
    pub format: String,
}

/// Errors surfaced by storage collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network failure or non-success response.
    #[error("request failed: {0}")]
    Request(String),

    /// The collaborator answered with something we cannot interpret.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Blob storage collaborator.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Request a short-lived, single-use URL accepting one binary write.
    async fn generate_upload_url(&self) -> StoreResult<String>;

    /// Write artifact bytes to an upload target.
    ///
    /// The write declares `content_type` and the collaborator answers with
    /// the opaque reference of the stored blob.
    async fn write_blob(
        &self,
        upload_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StoreResult<StorageId>;

    /// Resolve a blob reference to a fetchable URL.
    ///
    /// Returns `Ok(None)` when the blob no longer exists.
    async fn resolve_url(&self, storage_id: &StorageId) -> StoreResult<Option<String>>;
}

/// Metadata document store collaborator.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert one record; the store assigns and returns its identity.
    async fn insert(&self, record: NewImageRecord) -> StoreResult<AssetId>;

    /// Fetch all records in store insertion order. No pagination.
    async fn list(&self) -> StoreResult<Vec<ImageRecord>>;
}
