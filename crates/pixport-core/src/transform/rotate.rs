//! In-frame rotation of the export surface.
//!
//! Rotation is applied as a drawing transform on the already-composited
//! surface: the frame keeps its dimensions, the content rotates about the
//! frame's own center, and anything rotating out of the frame is clipped.
//! Corners the content no longer covers become opaque black, which is what
//! encoding an untouched surface region yields.
//!
//! The pivot is the crop frame's center, not the source image's center, so
//! rotated off-center crops pivot on the export frame. This reproduces the
//! observed behavior of the interactive editor as-is.
//!
//! # Algorithm
//!
//! Inverse mapping: for each destination pixel, find the source point that
//! lands on it under a clockwise rotation by `angle` about the center, and
//! sample it with bilinear interpolation.

use crate::bitmap::Bitmap;

use super::sample_bilinear;

/// Rotate a surface about its own center, keeping its dimensions.
///
/// # Arguments
///
/// * `image` - The composited surface to rotate
/// * `angle_degrees` - Rotation angle in degrees, positive = clockwise
///
/// # Returns
///
/// A new `Bitmap` with identical dimensions. Uncovered corners are black.
pub fn rotate_in_frame(image: &Bitmap, angle_degrees: f64) -> Bitmap {
    // Fast path: no rotation needed (including multiples of 360)
    let normalized = angle_degrees % 360.0;
    if normalized.abs() < 0.001 || (360.0 - normalized.abs()).abs() < 0.001 {
        return image.clone();
    }

    let (w, h) = (image.width, image.height);
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;

    // Degrees to radians via pi/180; clockwise positive
    let rad = angle_degrees.to_radians();
    let (sin, cos) = rad.sin_cos();

    let mut output = vec![0u8; (w as usize) * (h as usize) * 3];

    for dst_y in 0..h {
        for dst_x in 0..w {
            let dx = dst_x as f64 - cx;
            let dy = dst_y as f64 - cy;

            // Inverse of a clockwise rotation about the center
            let src_x = dx * cos + dy * sin + cx;
            let src_y = -dx * sin + dy * cos + cy;

            let dst_idx = ((dst_y as usize) * (w as usize) + dst_x as usize) * 3;

            // Content rotated out of frame leaves black behind
            let pixel = if out_of_frame(src_x, src_y, w, h) {
                [0, 0, 0]
            } else {
                sample_bilinear(image, src_x, src_y)
            };

            output[dst_idx] = pixel[0];
            output[dst_idx + 1] = pixel[1];
            output[dst_idx + 2] = pixel[2];
        }
    }

    Bitmap::new(w, h, output)
}

/// True when a source coordinate falls outside the pixel grid entirely.
#[inline]
fn out_of_frame(x: f64, y: f64, width: u32, height: u32) -> bool {
    x < -0.5 || y < -0.5 || x > width as f64 - 0.5 || y > height as f64 - 0.5
}


// ============================================================================
// Property-Based Tests
// ============================================================================
