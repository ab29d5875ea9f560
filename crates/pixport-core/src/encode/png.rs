//! PNG encoding for export.
//!
//! Lossless encoding via the `image` crate's PNG encoder: decoding the
//! output reproduces the input pixels exactly.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;

use super::{validate_rgb_buffer, EncodeError};

/// Encode RGB pixel data to PNG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate_rgb_buffer(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    let encoder = PngEncoder::new(&mut buffer);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// PNG signature bytes.
    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_basic() {
        let pixels = vec![128u8; 50 * 50 * 3];
        let png_bytes = encode_png(&pixels, 50, 50).unwrap();

        assert_eq!(&png_bytes[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_encode_png_lossless_roundtrip() {
        // Unique pixel values survive an encode/decode cycle exactly
        let mut pixels = Vec::with_capacity(16 * 16 * 3);
        for i in 0..(16 * 16) {
            pixels.push((i % 256) as u8);
            pixels.push(((i * 7) % 256) as u8);
            pixels.push(((i * 13) % 256) as u8);
        }

        let png_bytes = encode_png(&pixels, 16, 16).unwrap();
        let decoded = image::load_from_memory(&png_bytes).unwrap().into_rgb8();

        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    fn test_encode_png_invalid_pixel_data() {
        let pixels = vec![128u8; 10];
        let result = encode_png(&pixels, 10, 10);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_png_zero_dimensions() {
        let result = encode_png(&[], 0, 10);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_encode_png_one_pixel() {
        let pixels = vec![0, 255, 0];
        let png_bytes = encode_png(&pixels, 1, 1).unwrap();
        assert_eq!(&png_bytes[0..8], &PNG_MAGIC);
    }
}
