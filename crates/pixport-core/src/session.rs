//! Edit session state machine.
//!
//! An [`EditSession`] owns the in-memory state of one editing pass: the
//! decoded source bitmap, the display scale it is rendered at, the current
//! filter values, and the crop selection. Export is only valid once a
//! non-empty crop has been confirmed.
//!
//! # States
//!
//! ```text
//! NoImage → ImageLoaded → CropInProgress → CropCompleted
//! ```
//!
//! Loading a new image discards all previous state, including filters.
//!
//! # Coordinate spaces
//!
//! The crop tool operates in rendered (display) pixel space, while the
//! source bitmap is addressed in natural pixel space. A [`CropRegion`] must
//! be converted through the session's [`DisplayScale`] before any pixels
//! are touched; skipping that conversion produces spatially wrong output.

use thiserror::Error;

use crate::bitmap::Bitmap;
use crate::FilterState;

/// Errors produced by session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Export requested without a loaded image and a completed, non-empty crop.
    #[error("no source image or completed crop region to export")]
    PreconditionNotMet,

    /// A crop operation was attempted before any image was loaded.
    #[error("no image loaded")]
    NoImage,
}

/// A rectangular crop selection in display-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A region is empty when it would rasterize to zero pixels on either axis.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width.round() < 1.0
            || self.height.round() < 1.0
    }

    /// Re-derive this region in natural pixel space by multiplying each
    /// axis by the display scale.
    pub fn to_natural(&self, scale: &DisplayScale) -> CropRegion {
        CropRegion {
            x: self.x * scale.x,
            y: self.y * scale.y,
            width: self.width * scale.x,
            height: self.height * scale.y,
        }
    }

    /// Pixel dimensions of the export surface for this region.
    ///
    /// The surface is sized to the display-space width and height, rounded
    /// to whole pixels.
    pub fn output_dimensions(&self) -> (u32, u32) {
        (
            self.width.round().max(0.0) as u32,
            self.height.round().max(0.0) as u32,
        )
    }
}

/// Ratio of natural to rendered pixel dimensions, per axis.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DisplayScale {
    pub x: f64,
    pub y: f64,
}

impl DisplayScale {
    /// No scaling: the image is displayed at its natural size.
    pub fn identity() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// Compute the scale from natural and rendered dimensions.
    pub fn from_dimensions(natural: (u32, u32), rendered: (u32, u32)) -> Self {
        Self {
            x: natural.0 as f64 / rendered.0.max(1) as f64,
            y: natural.1 as f64 / rendered.1.max(1) as f64,
        }
    }
}

/// Which state the session is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    NoImage,
    ImageLoaded,
    CropInProgress,
    CropCompleted,
}

#[derive(Debug, Clone, PartialEq)]
enum CropState {
    None,
    InProgress(CropRegion),
    Completed(CropRegion),
}

#[derive(Debug)]
struct LoadedImage {
    source: Bitmap,
    name: String,
    scale: DisplayScale,
    filters: FilterState,
    crop: CropState,
}

/// Everything the render pipeline needs, borrowed from a session in the
/// `CropCompleted` state.
#[derive(Debug)]
pub struct ExportInput<'a> {
    pub source: &'a Bitmap,
    pub name: &'a str,
    pub crop: CropRegion,
    pub scale: DisplayScale,
    pub filters: FilterState,
}

/// The edit session state machine.
#[derive(Debug, Default)]
pub struct EditSession {
    loaded: Option<LoadedImage>,
}

impl EditSession {
    /// Create a session in the `NoImage` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a source image, replacing any previous session state.
    ///
    /// `rendered` is the on-screen size the image is displayed at; the
    /// display scale is derived from it. Filters reset to identity, and any
    /// crop selection is discarded.
    pub fn load_image(&mut self, source: Bitmap, name: impl Into<String>, rendered: (u32, u32)) {
        let scale = DisplayScale::from_dimensions((source.width, source.height), rendered);
        self.loaded = Some(LoadedImage {
            source,
            name: name.into(),
            scale,
            filters: FilterState::new(),
            crop: CropState::None,
        });
    }

    /// Discard all state, returning to `NoImage`.
    pub fn clear(&mut self) {
        self.loaded = None;
    }

    pub fn stage(&self) -> SessionStage {
        match &self.loaded {
            None => SessionStage::NoImage,
            Some(img) => match img.crop {
                CropState::None => SessionStage::ImageLoaded,
                CropState::InProgress(_) => SessionStage::CropInProgress,
                CropState::Completed(_) => SessionStage::CropCompleted,
            },
        }
    }

    /// Begin or update an in-progress crop drag.
    pub fn update_crop(&mut self, region: CropRegion) -> Result<(), SessionError> {
        let img = self.loaded.as_mut().ok_or(SessionError::NoImage)?;
        img.crop = CropState::InProgress(region);
        Ok(())
    }

    /// Confirm the in-progress crop selection.
    ///
    /// A completed crop is distinct from an in-progress drag: only a
    /// completed, non-empty region makes the session exportable.
    pub fn complete_crop(&mut self) -> Result<(), SessionError> {
        let img = self.loaded.as_mut().ok_or(SessionError::NoImage)?;
        match img.crop {
            CropState::InProgress(region) | CropState::Completed(region) => {
                img.crop = CropState::Completed(region);
                Ok(())
            }
            CropState::None => Err(SessionError::PreconditionNotMet),
        }
    }

    /// The confirmed crop region, if any.
    pub fn completed_crop(&self) -> Option<CropRegion> {
        match self.loaded.as_ref()?.crop {
            CropState::Completed(region) => Some(region),
            _ => None,
        }
    }

    pub fn filters(&self) -> Option<&FilterState> {
        self.loaded.as_ref().map(|img| &img.filters)
    }

    pub fn set_filters(&mut self, filters: FilterState) -> Result<(), SessionError> {
        let img = self.loaded.as_mut().ok_or(SessionError::NoImage)?;
        img.filters = filters;
        Ok(())
    }

    /// Restore filters to identity without touching the crop.
    pub fn reset_filters(&mut self) -> Result<(), SessionError> {
        let img = self.loaded.as_mut().ok_or(SessionError::NoImage)?;
        img.filters.reset();
        Ok(())
    }

    /// Borrow everything the export pipeline needs.
    ///
    /// Fails with [`SessionError::PreconditionNotMet`] unless an image is
    /// loaded and a non-empty crop has been completed. This is the gate the
    /// export action checks before any rendering or network work starts.
    pub fn export_input(&self) -> Result<ExportInput<'_>, SessionError> {
        let img = self.loaded.as_ref().ok_or(SessionError::PreconditionNotMet)?;
        let crop = match img.crop {
            CropState::Completed(region) if !region.is_empty() => region,
            _ => return Err(SessionError::PreconditionNotMet),
        };
        Ok(ExportInput {
            source: &img.source,
            name: &img.name,
            crop,
            scale: img.scale,
            filters: img.filters,
        })
    }
}
