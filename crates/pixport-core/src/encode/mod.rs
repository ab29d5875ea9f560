//! Artifact encoding for export.
//!
//! This module provides the three export encoders:
//! - JPEG (lossy, exports use maximum nominal quality)
//! - PNG (lossless)
//! - PDF (a maximum-quality JPEG pass embedded as a single full-page image)
//!
//! All encoders operate on RGB pixel buffers and return encoded bytes.

mod jpeg;
mod pdf;
mod png;

pub use jpeg::encode_jpeg;
pub use pdf::encode_pdf;
pub use png::encode_png;

use thiserror::Error;

/// Errors that can occur during artifact encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the data or parameters
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Validate an RGB buffer against the claimed dimensions.
fn validate_rgb_buffer(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    Ok(())
}
