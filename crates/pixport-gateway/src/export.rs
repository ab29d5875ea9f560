//! Top-level export orchestration.
//!
//! Renders the session's completed crop into the requested format and
//! routes the artifact: rasters go to the backend through the gateway, PDFs
//! go to the local filesystem. Session preconditions are checked before
//! any rendering or collaborator work starts.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use pixport_core::{render, EditSession, ExportFormat, RenderError, SessionError};

use crate::gateway::{AssetGateway, GatewayError};
use crate::save::{save_local, SaveError};
use crate::store::{AssetId, BlobStore, MetadataStore};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Where a finished export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Raster persisted to the backend under this asset identity.
    Stored(AssetId),
    /// PDF written to the local filesystem at this path.
    Saved(PathBuf),
}

/// Run a full export of the session's completed crop.
///
/// # Errors
///
/// [`ExportError::Session`] when no image is loaded or no crop has been
/// completed; in that case no rendering happens and no collaborator is
/// contacted. Downstream failures pass through unchanged.
pub async fn export_session<B, M>(
    session: &EditSession,
    format: ExportFormat,
    gateway: &AssetGateway<B, M>,
    output_dir: &Path,
) -> Result<ExportOutcome, ExportError>
where
    B: BlobStore,
    M: MetadataStore,
{
    let input = session.export_input().inspect_err(|e| {
        error!(error = %e, "export refused");
    })?;

    let artifact = render(input.source, &input.crop, input.scale, &input.filters, format)
        .inspect_err(|e| {
            error!(error = %e, "render failed");
        })?;

    let outcome = match format {
        ExportFormat::Jpeg | ExportFormat::Png => {
            let id = gateway
                .persist(&artifact, input.name)
                .await
                .inspect_err(|e| {
                    error!(error = %e, "persist failed");
                })?;
            ExportOutcome::Stored(id)
        }
        ExportFormat::Pdf => {
            let path = save_local(&artifact, output_dir).inspect_err(|e| {
                error!(error = %e, "local save failed");
            })?;
            ExportOutcome::Saved(path)
        }
    };

    info!(format = %format, "export complete");
    Ok(outcome)
}
