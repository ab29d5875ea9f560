//! In-memory bitmap type and source-image decoding.
//!
//! A [`Bitmap`] holds RGB8 pixel data in row-major order, 3 bytes per
//! pixel. Source files are decoded by sniffing the container format from
//! the bytes themselves (JPEG or PNG); anything else is rejected.

use std::io::Cursor;

use image::ImageReader;
use thiserror::Error;

/// Error types for bitmap decoding operations.
#[derive(Debug, Error)]
pub enum BitmapError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// A decoded image with RGB pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a new Bitmap with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width * height * 3) as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode a source image (JPEG or PNG) from raw file bytes.
    ///
    /// The format is guessed from the byte content, not from a filename.
    pub fn decode(bytes: &[u8]) -> Result<Self, BitmapError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| BitmapError::CorruptedFile(e.to_string()))?;

        if reader.format().is_none() {
            return Err(BitmapError::InvalidFormat);
        }

        let img = reader
            .decode()
            .map_err(|e| BitmapError::CorruptedFile(e.to_string()))?;

        Ok(Self::from_rgb_image(img.into_rgb8()))
    }

    /// Create a Bitmap from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
