//! Color filter pass for the export surface.
//!
//! Applies the brightness/contrast/saturation triple to RGB pixel data as
//! a single composited per-pixel pass, reproducing a 2D canvas filter list
//! `brightness(b%) contrast(c%) saturate(s%)` evaluated in that order.
//!
//! Semantics are multiplicative percentages: 100 is identity, 0 fully
//! attenuates, 200 doubles. Rotation is spatial and lives in
//! [`crate::transform`], not here.

use crate::FilterState;

/// Apply the color filter triple to an image's pixel data in place.
///
/// # Arguments
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `state` - Filter values; the rotation field is ignored here
///
/// # Example
/// ```
/// use pixport_core::{filter::apply_filters, FilterState};
///
/// let mut pixels = vec![100, 100, 100]; // Single gray pixel
/// let mut state = FilterState::default();
/// state.brightness = 200.0;
///
/// apply_filters(&mut pixels, &state);
/// // Pixel is now twice as bright
/// ```
pub fn apply_filters(pixels: &mut [u8], state: &FilterState) {
    // Early exit if no color adjustments
    if !state.has_color_adjustments() {
        return;
    }

    let brightness = state.brightness / 100.0;
    let contrast = state.contrast / 100.0;
    let saturation = state.saturation / 100.0;

    for chunk in pixels.chunks_exact_mut(3) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        (r, g, b) = apply_brightness(r, g, b, brightness);
        (r, g, b) = apply_contrast(r, g, b, contrast);
        (r, g, b) = apply_saturate(r, g, b, saturation);

        chunk[0] = (r.clamp(0.0, 1.0) * 255.0).round() as u8;
        chunk[1] = (g.clamp(0.0, 1.0) * 255.0).round() as u8;
        chunk[2] = (b.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

/// Brightness: linear multiplier on each channel.
///
/// Formula: `output = input * amount`
#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    if amount == 1.0 {
        return (r, g, b);
    }
    (r * amount, g * amount, b * amount)
}

/// Contrast: scale each channel away from or toward mid-gray.
///
/// Formula: `output = (input - 0.5) * amount + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    if amount == 1.0 {
        return (r, g, b);
    }
    (
        (r - 0.5) * amount + 0.5,
        (g - 0.5) * amount + 0.5,
        (b - 0.5) * amount + 0.5,
    )
}

/// Saturate: interpolate between luminance gray and the color.
///
/// Amount 0 is grayscale, 1 is identity, >1 oversaturates.
#[inline]
fn apply_saturate(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    if amount == 1.0 {
        return (r, g, b);
    }
    let gray = luminance(r, g, b);
    (
        gray + (r - gray) * amount,
        gray + (g - gray) * amount,
        gray + (b - gray) * amount,
    )
}

/// Calculate luminance using ITU-R BT.709 coefficients.
#[inline]
fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(brightness: f32, contrast: f32, saturation: f32) -> FilterState {
        FilterState {
            brightness,
            contrast,
            saturation,
            rotation: 0.0,
        }
    }

    #[test]
    fn test_identity_is_pixel_exact_noop() {
        let original: Vec<u8> = (0..=255).flat_map(|v| [v, 255 - v, v / 2]).collect();
        let mut pixels = original.clone();

        apply_filters(&mut pixels, &state(100.0, 100.0, 100.0));
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_identity_with_rotation_is_noop() {
        // Rotation is spatial; the color pass must not touch pixels for it
        let original = vec![10u8, 20, 30];
        let mut pixels = original.clone();
        let mut s = state(100.0, 100.0, 100.0);
        s.rotation = 90.0;

        apply_filters(&mut pixels, &s);
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_brightness_doubles() {
        let mut pixels = vec![64u8, 64, 64];
        apply_filters(&mut pixels, &state(200.0, 100.0, 100.0));
        assert_eq!(pixels, vec![128, 128, 128]);
    }

    #[test]
    fn test_brightness_zero_is_black() {
        let mut pixels = vec![200u8, 100, 50];
        apply_filters(&mut pixels, &state(0.0, 100.0, 100.0));
        assert_eq!(pixels, vec![0, 0, 0]);
    }

    #[test]
    fn test_brightness_clamps_at_white() {
        let mut pixels = vec![200u8, 200, 200];
        apply_filters(&mut pixels, &state(200.0, 100.0, 100.0));
        assert_eq!(pixels, vec![255, 255, 255]);
    }

    #[test]
    fn test_contrast_zero_collapses_to_mid_gray() {
        let mut pixels = vec![10u8, 128, 250];
        apply_filters(&mut pixels, &state(100.0, 0.0, 100.0));
        // Every channel lands on 0.5 * 255, rounded
        assert_eq!(pixels, vec![128, 128, 128]);
    }

    #[test]
    fn test_contrast_increase_spreads_values() {
        let mut pixels = vec![64u8, 192, 128];
        apply_filters(&mut pixels, &state(100.0, 200.0, 100.0));
        assert!(pixels[0] < 64, "dark channel got darker: {}", pixels[0]);
        assert!(pixels[1] > 192, "bright channel got brighter: {}", pixels[1]);
    }

    #[test]
    fn test_saturation_zero_is_grayscale() {
        let mut pixels = vec![255u8, 0, 0, 0, 255, 0];
        apply_filters(&mut pixels, &state(100.0, 100.0, 0.0));

        for chunk in pixels.chunks_exact(3) {
            assert_eq!(chunk[0], chunk[1]);
            assert_eq!(chunk[1], chunk[2]);
        }
        // Green is far brighter than red under BT.709
        assert!(pixels[3] > pixels[0]);
    }

    #[test]
    fn test_saturation_boost_leaves_gray_untouched() {
        let mut pixels = vec![128u8, 128, 128];
        apply_filters(&mut pixels, &state(100.0, 100.0, 200.0));
        assert_eq!(pixels, vec![128, 128, 128]);
    }

    #[test]
    fn test_brightness_150_on_midtone() {
        let mut pixels = vec![100u8, 100, 100];
        apply_filters(&mut pixels, &state(150.0, 100.0, 100.0));
        assert_eq!(pixels, vec![150, 150, 150]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
