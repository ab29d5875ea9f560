//! Pixport Core - Image export pipeline
//!
//! This crate provides the core processing functionality for Pixport:
//! decoding source images, tracking the edit session (crop region, filter
//! values, display scale), compositing the export surface, and encoding it
//! as JPEG, PNG, or PDF.
//!
//! All operations are synchronous and side-effect free; persistence lives
//! in the `pixport-gateway` crate.

pub mod bitmap;
pub mod encode;
pub mod filter;
pub mod render;
pub mod session;
pub mod transform;

pub use bitmap::{Bitmap, BitmapError};
pub use render::{render, ExportArtifact, ExportFormat, RenderError};
pub use session::{CropRegion, DisplayScale, EditSession, SessionError, SessionStage};

/// Filter parameters for an export, matching the on-screen preview.
///
/// Brightness, contrast, and saturation use multiplicative percentage
/// semantics: 100 is identity, 0 fully attenuates, 200 doubles. Rotation is
/// in degrees, positive = clockwise.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterState {
    /// Brightness percentage (0 to 200, 100 = identity)
    pub brightness: f32,
    /// Contrast percentage (0 to 200, 100 = identity)
    pub contrast: f32,
    /// Saturation percentage (0 to 200, 100 = identity)
    pub saturation: f32,
    /// Rotation in degrees, clockwise (0 to 360)
    pub rotation: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            rotation: 0.0,
        }
    }
}

impl FilterState {
    /// Create a new FilterState with identity values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their identity defaults
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Check if any of the color filters (brightness/contrast/saturation)
    /// deviates from identity. Rotation is spatial and handled separately.
    pub fn has_color_adjustments(&self) -> bool {
        self.brightness != 100.0 || self.contrast != 100.0 || self.saturation != 100.0
    }

    /// Check if the rotation angle is effectively non-zero (modulo full turns).
    pub fn has_rotation(&self) -> bool {
        let normalized = self.rotation % 360.0;
        normalized.abs() > 0.001 && (360.0 - normalized.abs()).abs() > 0.001
    }

    /// Restore all values to identity (the UI's "reset filters" action)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
