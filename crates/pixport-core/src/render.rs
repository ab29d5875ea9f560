//! The export pipeline: composite a crop into an encoded artifact.
//!
//! Fixed order, reproduced exactly for visual parity with the interactive
//! preview:
//!
//! 1. Allocate the output surface, sized to the crop region's rounded
//!    width and height
//! 2. Draw the natural-space sub-rectangle of the source into it, cropping
//!    and rescaling in one operation
//! 3. Apply the brightness/contrast/saturation triple as one composited
//!    pass over the drawn content
//! 4. If rotation is non-zero, rotate the drawing about the frame's center
//!    (untouched corners stay black and unfiltered)
//! 5. Encode per the target format
//!
//! The pipeline is a pure function: no global state, nothing but the
//! returned artifact survives the call.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::bitmap::Bitmap;
use crate::encode::{encode_jpeg, encode_png, encode_pdf, EncodeError};
use crate::filter::apply_filters;
use crate::session::{CropRegion, DisplayScale};
use crate::transform::{extract_region, rotate_in_frame};
use crate::FilterState;

/// JPEG quality used for all exports (maximum nominal quality).
const EXPORT_JPEG_QUALITY: u8 = 100;

/// Closed set of export formats, validated at the system boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Jpeg,
    Png,
    Pdf,
}

impl ExportFormat {
    /// The wire-level format string ("jpeg" | "png" | "pdf").
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// MIME type of the encoded artifact.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Raster formats are persisted to the backend; PDF is saved locally.
    pub fn is_raster(&self) -> bool {
        !matches!(self, ExportFormat::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for format strings outside the accepted set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported export format {0:?} (expected \"jpeg\", \"png\", or \"pdf\")")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    /// Accepts exactly the literals `"jpeg"`, `"png"`, and `"pdf"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpeg" => Ok(ExportFormat::Jpeg),
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// The encoded output of one export invocation.
///
/// Produced fresh per invocation; never cached or reused.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
}

impl ExportArtifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Errors that can occur while rendering an export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No source image or the crop region is empty.
    #[error("no source image or completed crop region to export")]
    PreconditionNotMet,

    /// The output surface could not be allocated.
    #[error("cannot allocate a {width}x{height} render surface")]
    SurfaceUnavailable { width: u32, height: u32 },

    /// The codec rejected the composited surface.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),
}

impl From<EncodeError> for RenderError {
    fn from(err: EncodeError) -> Self {
        RenderError::EncodingFailed(err.to_string())
    }
}

/// Render a crop of `source` into an encoded artifact.
///
/// # Arguments
///
/// * `source` - Decoded source bitmap (natural pixel space)
/// * `crop` - Confirmed crop region in display-space pixels
/// * `scale` - Natural-to-rendered ratio used to re-derive the crop
/// * `filters` - Brightness/contrast/saturation percentages and rotation
/// * `format` - Target encoding
///
/// # Errors
///
/// * [`RenderError::PreconditionNotMet`] when the source or crop is empty
/// * [`RenderError::SurfaceUnavailable`] when the surface cannot be allocated
/// * [`RenderError::EncodingFailed`] when the codec rejects the surface
pub fn render(
    source: &Bitmap,
    crop: &CropRegion,
    scale: DisplayScale,
    filters: &FilterState,
    format: ExportFormat,
) -> Result<ExportArtifact, RenderError> {
    if source.is_empty() || crop.is_empty() {
        return Err(RenderError::PreconditionNotMet);
    }

    let (out_width, out_height) = crop.output_dimensions();
    if out_width == 0 || out_height == 0 {
        return Err(RenderError::PreconditionNotMet);
    }

    // Surface allocation is bounded by addressable buffer size
    (out_width as usize)
        .checked_mul(out_height as usize)
        .and_then(|n| n.checked_mul(3))
        .filter(|n| *n <= i32::MAX as usize)
        .ok_or(RenderError::SurfaceUnavailable {
            width: out_width,
            height: out_height,
        })?;

    // Crop and rescale in one draw, addressing the source in natural space
    let natural = crop.to_natural(&scale);
    let mut surface = extract_region(source, &natural, out_width, out_height);

    // Color filters apply to the drawn content only
    apply_filters(&mut surface.pixels, filters);

    if filters.has_rotation() {
        surface = rotate_in_frame(&surface, filters.rotation);
    }

    let bytes = match format {
        ExportFormat::Jpeg => encode_jpeg(
            &surface.pixels,
            surface.width,
            surface.height,
            EXPORT_JPEG_QUALITY,
        )?,
        ExportFormat::Png => encode_png(&surface.pixels, surface.width, surface.height)?,
        ExportFormat::Pdf => encode_pdf(&surface)?,
    };

    Ok(ExportArtifact { bytes, format })
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn test_source(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x % 256) as u8);
                pixels.push((y % 256) as u8);
                pixels.push(128);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    proptest! {
        /// Property: for in-bounds crops, PNG output decodes to exactly
        /// round(width) x round(height) pixels.
        #[test]
        fn prop_png_dimensions_match_rounded_crop(
            (x, y) in (0.0f64..=20.0, 0.0f64..=20.0),
            (w, h) in (1.0f64..=40.0, 1.0f64..=40.0),
        ) {
            let source = test_source(64, 64);
            let crop = CropRegion::new(x, y, w, h);
            let artifact = render(
                &source,
                &crop,
                DisplayScale::identity(),
                &FilterState::default(),
                ExportFormat::Png,
            ).unwrap();

            let decoded = image::load_from_memory(&artifact.bytes).unwrap();
            prop_assert_eq!(decoded.width(), w.round() as u32);
            prop_assert_eq!(decoded.height(), h.round() as u32);
        }

        /// Property: rendering is deterministic across formats.
        #[test]
        fn prop_render_deterministic(
            format in prop_oneof![
                Just(ExportFormat::Jpeg),
                Just(ExportFormat::Png),
            ],
            brightness in 0.0f32..=200.0,
        ) {
            let source = test_source(32, 32);
            let crop = CropRegion::new(4.0, 4.0, 16.0, 16.0);
            let filters = FilterState { brightness, ..FilterState::default() };

            let a = render(&source, &crop, DisplayScale::identity(), &filters, format).unwrap();
            let b = render(&source, &crop, DisplayScale::identity(), &filters, format).unwrap();
            prop_assert_eq!(a.bytes, b.bytes);
        }
    }
}
