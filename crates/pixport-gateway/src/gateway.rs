//! The asset persistence gateway.
//!
//! Coordinates the blob store and the metadata store for the raster export
//! path: obtain an upload target, write the artifact bytes, record one
//! metadata entry. Steps are strictly sequential and dependent; the first
//! failure aborts with no retry and no partial-success recovery (an
//! orphaned blob without a record is possible and accepted).
//!
//! Listing fans out URL resolution concurrently and captures each item's
//! outcome independently, so one missing blob never hides the rest of the
//! gallery.

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, instrument, warn};

use pixport_core::ExportArtifact;

use crate::store::{AssetId, BlobStore, ImageRecord, MetadataStore, NewImageRecord, StoreError};

/// Errors surfaced by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// PDF artifacts are saved locally and never persisted.
    #[error("artifact format is not persistable to the backend")]
    NotPersistable,

    /// Network failure or non-success response at any persistence step.
    #[error("upload failed: {0}")]
    UploadFailed(#[source] StoreError),

    /// The metadata listing itself could not be fetched.
    #[error("listing failed: {0}")]
    ListFailed(#[source] StoreError),
}

/// Per-asset URL resolution failure. Non-fatal: the asset stays listed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not resolve a download URL: {0}")]
pub struct UrlResolutionError(pub String);

/// One gallery entry: the stored record plus its resolution outcome.
#[derive(Debug, Clone)]
pub struct ListedAsset {
    pub record: ImageRecord,
    /// Resolved download URL, or why this one asset has none.
    pub url: Result<String, UrlResolutionError>,
}

/// Coordinates blob storage and the metadata store.
pub struct AssetGateway<B, M> {
    blob: B,
    meta: M,
}

impl<B: BlobStore, M: MetadataStore> AssetGateway<B, M> {
    pub fn new(blob: B, meta: M) -> Self {
        Self { blob, meta }
    }

    /// Persist a raster artifact and record its metadata.
    ///
    /// # Steps
    ///
    /// 1. Request a one-time upload target
    /// 2. Write the artifact bytes with its MIME type; the store answers
    ///    with the blob reference
    /// 3. Insert one metadata record `{storageId, name, format}`
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotPersistable`] for PDF artifacts;
    /// [`GatewayError::UploadFailed`] when any step fails. No retries.
    #[instrument(skip(self, artifact), fields(format = %artifact.format, bytes = artifact.len()))]
    pub async fn persist(
        &self,
        artifact: &ExportArtifact,
        display_name: &str,
    ) -> Result<AssetId, GatewayError> {
        if !artifact.format.is_raster() {
            return Err(GatewayError::NotPersistable);
        }

        let upload_url = self
            .blob
            .generate_upload_url()
            .await
            .map_err(GatewayError::UploadFailed)?;

        let storage_id = self
            .blob
            .write_blob(&upload_url, artifact.mime_type(), artifact.bytes.clone())
            .await
            .map_err(GatewayError::UploadFailed)?;

        let asset_id = self
            .meta
            .insert(NewImageRecord {
                storage_id: storage_id.clone(),
                name: display_name.to_string(),
                format: artifact.format.as_str().to_string(),
            })
            .await
            .map_err(GatewayError::UploadFailed)?;

        info!(
            asset_id = asset_id.as_str(),
            storage_id = storage_id.as_str(),
            "persisted export"
        );
        Ok(asset_id)
    }

    /// List all stored assets, each with an independently resolved URL.
    ///
    /// Resolutions are issued concurrently and awaited as a batch; a
    /// failure (or a vanished blob) in one item is captured in that item's
    /// `url` result and never aborts the listing.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ListedAsset>, GatewayError> {
        let records = self.meta.list().await.map_err(GatewayError::ListFailed)?;

        let resolutions = join_all(
            records
                .iter()
                .map(|record| self.blob.resolve_url(&record.storage_id)),
        )
        .await;

        let assets = records
            .into_iter()
            .zip(resolutions)
            .map(|(record, resolution)| {
                let url = match resolution {
                    Ok(Some(url)) => Ok(url),
                    Ok(None) => Err(UrlResolutionError("blob no longer exists".to_string())),
                    Err(e) => Err(UrlResolutionError(e.to_string())),
                };
                if let Err(e) = &url {
                    warn!(
                        storage_id = record.storage_id.as_str(),
                        error = %e,
                        "URL resolution failed for one asset"
                    );
                }
                ListedAsset { record, url }
            })
            .collect();

        Ok(assets)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory collaborators for tests: count calls, record inserts, and
    //! fail on demand.

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::store::{
        AssetId, BlobStore, ImageRecord, MetadataStore, NewImageRecord, StorageId, StoreError,
        StoreResult,
    };

    #[derive(Default)]
    pub struct MockBackend {
        pub upload_url_calls: AtomicUsize,
        pub write_calls: AtomicUsize,
        pub insert_calls: AtomicUsize,
        pub resolve_calls: AtomicUsize,
        pub fail_write: bool,
        pub fail_resolve_for: HashSet<String>,
        pub missing_blobs: HashSet<String>,
        pub records: Mutex<Vec<ImageRecord>>,
        pub last_content_type: Mutex<Option<String>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn network_calls(&self) -> usize {
            self.upload_url_calls.load(Ordering::SeqCst)
                + self.write_calls.load(Ordering::SeqCst)
                + self.insert_calls.load(Ordering::SeqCst)
                + self.resolve_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BlobStore for &MockBackend {
        async fn generate_upload_url(&self) -> StoreResult<String> {
            self.upload_url_calls.fetch_add(1, Ordering::SeqCst);
            Ok("https://upload.test/target".to_string())
        }

        async fn write_blob(
            &self,
            _upload_url: &str,
            content_type: &str,
            _bytes: Vec<u8>,
        ) -> StoreResult<StorageId> {
            let n = self.write_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_write {
                return Err(StoreError::Request("connection reset".to_string()));
            }
            *self.last_content_type.lock().unwrap() = Some(content_type.to_string());
            Ok(StorageId(format!("st_{n}")))
        }

        async fn resolve_url(&self, storage_id: &StorageId) -> StoreResult<Option<String>> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_resolve_for.contains(storage_id.as_str()) {
                return Err(StoreError::Request("resolution timed out".to_string()));
            }
            if self.missing_blobs.contains(storage_id.as_str()) {
                return Ok(None);
            }
            Ok(Some(format!("https://cdn.test/{}", storage_id.as_str())))
        }
    }

    #[async_trait]
    impl MetadataStore for &MockBackend {
        async fn insert(&self, record: NewImageRecord) -> StoreResult<AssetId> {
            let n = self.insert_calls.fetch_add(1, Ordering::SeqCst);
            let id = AssetId(format!("asset_{n}"));
            self.records.lock().unwrap().push(ImageRecord {
                id: id.clone(),
                storage_id: record.storage_id,
                name: record.name,
                format: record.format,
                owner_ref: None,
            });
            Ok(id)
        }

        async fn list(&self) -> StoreResult<Vec<ImageRecord>> {
            Ok(self.records.lock().unwrap().clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockBackend;
    use super::*;
    use pixport_core::ExportFormat;

    fn artifact(format: ExportFormat) -> ExportArtifact {
        ExportArtifact {
            bytes: vec![1, 2, 3, 4],
            format,
        }
    }

    #[tokio::test]
    async fn test_persist_creates_exactly_one_record() {
        let backend = MockBackend::new();
        let gateway = AssetGateway::new(&backend, &backend);

        let id = gateway
            .persist(&artifact(ExportFormat::Jpeg), "holiday.jpg")
            .await
            .unwrap();

        let records = backend.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].name, "holiday.jpg");
        assert_eq!(records[0].format, "jpeg");
    }

    #[tokio::test]
    async fn test_persist_declares_artifact_mime_type() {
        let backend = MockBackend::new();
        let gateway = AssetGateway::new(&backend, &backend);

        gateway
            .persist(&artifact(ExportFormat::Png), "pic.png")
            .await
            .unwrap();

        assert_eq!(
            backend.last_content_type.lock().unwrap().as_deref(),
            Some("image/png")
        );
    }

    #[tokio::test]
    async fn test_persist_rejects_pdf() {
        let backend = MockBackend::new();
        let gateway = AssetGateway::new(&backend, &backend);

        let result = gateway
            .persist(&artifact(ExportFormat::Pdf), "doc.pdf")
            .await;

        assert!(matches!(result, Err(GatewayError::NotPersistable)));
        assert_eq!(backend.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_persist_failure_aborts_before_insert() {
        let mut backend = MockBackend::new();
        backend.fail_write = true;
        let gateway = AssetGateway::new(&backend, &backend);

        let result = gateway
            .persist(&artifact(ExportFormat::Jpeg), "pic.jpg")
            .await;

        assert!(matches!(result, Err(GatewayError::UploadFailed(_))));
        assert_eq!(backend.insert_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(backend.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_resolves_urls() {
        let backend = MockBackend::new();
        let gateway = AssetGateway::new(&backend, &backend);

        gateway
            .persist(&artifact(ExportFormat::Jpeg), "a.jpg")
            .await
            .unwrap();
        gateway
            .persist(&artifact(ExportFormat::Png), "b.png")
            .await
            .unwrap();

        let assets = gateway.list().await.unwrap();
        assert_eq!(assets.len(), 2);
        for asset in &assets {
            let url = asset.url.as_ref().unwrap();
            assert!(url.starts_with("https://cdn.test/"));
        }
        // Insertion order preserved
        assert_eq!(assets[0].record.name, "a.jpg");
        assert_eq!(assets[1].record.name, "b.png");
    }

    #[tokio::test]
    async fn test_list_tolerates_partial_resolution_failure() {
        let mut backend = MockBackend::new();
        backend.fail_resolve_for.insert("st_1".to_string());
        let gateway = AssetGateway::new(&backend, &backend);

        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            gateway
                .persist(&artifact(ExportFormat::Jpeg), name)
                .await
                .unwrap();
        }

        let assets = gateway.list().await.unwrap();
        assert_eq!(assets.len(), 3, "failed item must stay listed");
        assert!(assets[0].url.is_ok());
        assert!(assets[1].url.is_err());
        assert!(assets[2].url.is_ok());
    }

    #[tokio::test]
    async fn test_list_maps_missing_blob_to_error_url() {
        let mut backend = MockBackend::new();
        backend.missing_blobs.insert("st_0".to_string());
        let gateway = AssetGateway::new(&backend, &backend);

        gateway
            .persist(&artifact(ExportFormat::Jpeg), "gone.jpg")
            .await
            .unwrap();

        let assets = gateway.list().await.unwrap();
        assert_eq!(assets.len(), 1);
        assert!(assets[0].url.is_err());
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let backend = MockBackend::new();
        let gateway = AssetGateway::new(&backend, &backend);

        let assets = gateway.list().await.unwrap();
        assert!(assets.is_empty());
        assert_eq!(backend.resolve_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
