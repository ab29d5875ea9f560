//! Persistence and delivery layer for pixport exports.
//!
//! [`pixport_core`] produces finished artifacts; this crate routes them.
//! Raster exports travel through the [`AssetGateway`] to a remote backend
//! (blob storage plus a metadata store, both behind async traits with an
//! HTTP implementation), while PDF exports are written to the local
//! filesystem. [`export_session`] ties the whole flow together.

pub mod export;
pub mod gateway;
pub mod http;
pub mod save;
pub mod store;

pub use export::{export_session, ExportError, ExportOutcome};
pub use gateway::{AssetGateway, GatewayError, ListedAsset, UrlResolutionError};
pub use http::{BackendConfig, HttpBackend};
pub use save::{save_local, SaveError};
pub use store::{AssetId, BlobStore, ImageRecord, MetadataStore, NewImageRecord, StorageId};
