//! Spatial operations on the export surface: crop extraction and rotation.
//!
//! # Pipeline Order
//!
//! When compositing an export, operations are applied in this order:
//! 1. Crop extraction + rescale (natural-space sub-rect → output surface)
//! 2. Color filters ([`crate::filter`])
//! 3. In-frame rotation
//!
//! # Coordinate System
//!
//! - Crop rectangles arriving here are in natural pixel space
//! - Rotation angles are in degrees, positive = clockwise
//! - Origin is the top-left corner

mod crop;
mod rotate;

pub use crop::extract_region;
pub use rotate::rotate_in_frame;

use crate::bitmap::Bitmap;

/// Get a pixel as [f32; 3] from an image at the given coordinates.
#[inline]
fn get_pixel_f32(image: &Bitmap, px: usize, py: usize) -> [f32; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f32,
        image.pixels[idx + 1] as f32,
        image.pixels[idx + 2] as f32,
    ]
}

/// Sample a pixel with bilinear interpolation, clamping coordinates to the
/// image bounds.
///
/// Exact integer coordinates resolve to the exact source pixel, which keeps
/// unscaled extraction lossless.
pub(crate) fn sample_bilinear(image: &Bitmap, x: f64, y: f64) -> [u8; 3] {
    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    // Fractional distances
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let p00 = get_pixel_f32(image, x0, y0);
    let p10 = get_pixel_f32(image, x1, y0);
    let p01 = get_pixel_f32(image, x0, y1);
    let p11 = get_pixel_f32(image, x1, y1);

    // Bilinear interpolation formula
    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}
