//! Local filesystem delivery for non-persistable artifacts.
//!
//! PDF exports bypass the backend entirely and land on disk under a fixed
//! stem, `cropped-image`, with the artifact's own extension.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use pixport_core::ExportArtifact;

/// Fixed stem of locally saved artifacts.
const LOCAL_FILE_STEM: &str = "cropped-image";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// Write an artifact into `dir` and return the created path.
///
/// The filename is always `cropped-image.<ext>`; an existing file with the
/// same name is overwritten.
pub fn save_local(artifact: &ExportArtifact, dir: &Path) -> Result<PathBuf, SaveError> {
    let path = dir.join(format!("{LOCAL_FILE_STEM}.{}", artifact.format.extension()));
    std::fs::write(&path, &artifact.bytes)?;

    info!(path = %path.display(), bytes = artifact.len(), "saved artifact locally");
    Ok(path)
}
