//! Crop extraction: natural-space sub-rectangle to output surface.
//!
//! This is the pipeline's single draw call: the source sub-rectangle is
//! sampled and rescaled onto the destination surface in one operation, so
//! a crop selected on a downscaled preview both crops and rescales here.

use crate::bitmap::Bitmap;
use crate::session::CropRegion;

use super::sample_bilinear;

/// Extract a natural-space sub-rectangle of `source`, rescaled to
/// `out_width` x `out_height`.
///
/// # Arguments
///
/// * `source` - Source bitmap, addressed in natural pixels
/// * `region` - Sub-rectangle in natural pixel space (already scale-converted)
/// * `out_width` / `out_height` - Destination surface dimensions
///
/// # Behavior
///
/// - Sample coordinates falling outside the source are clamped to its edge
/// - When the region size equals the output size and sits on integer
///   coordinates, pixels are copied exactly (no resampling loss)
pub fn extract_region(
    source: &Bitmap,
    region: &CropRegion,
    out_width: u32,
    out_height: u32,
) -> Bitmap {
    let mut output = vec![0u8; (out_width as usize) * (out_height as usize) * 3];

    // Source step per destination pixel on each axis
    let step_x = region.width / out_width as f64;
    let step_y = region.height / out_height as f64;

    for dst_y in 0..out_height {
        // Sample at the center of each destination pixel
        let src_y = region.y + (dst_y as f64 + 0.5) * step_y - 0.5;
        let dst_row_start = (dst_y as usize) * (out_width as usize) * 3;

        for dst_x in 0..out_width {
            let src_x = region.x + (dst_x as f64 + 0.5) * step_x - 0.5;

            let pixel = sample_bilinear(source, src_x, src_y);
            let dst_idx = dst_row_start + (dst_x as usize) * 3;
            output[dst_idx] = pixel[0];
            output[dst_idx + 1] = pixel[1];
            output[dst_idx + 2] = pixel[2];
        }
    }

    Bitmap::new(out_width, out_height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
