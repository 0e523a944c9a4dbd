// crates/caselens-core/src/filter.rs
//
// Contrast enhancement applied to decoded frame buffers.
//
// The same function runs in two places: the viewer bakes it into the texture
// it uploads, and the media worker bakes it into region crops so a captured
// region matches what the analyst saw on screen.

use rayon::prelude::*;

/// Slider range for the contrast gain. 1.0 is passthrough.
pub const CONTRAST_MIN: f32 = 0.5;
pub const CONTRAST_MAX: f32 = 2.0;
pub const CONTRAST_NEUTRAL: f32 = 1.0;

/// Gains this close to 1.0 skip the pixel pass entirely.
const PASSTHROUGH_EPS: f32 = 1e-3;

// Chunk sizes are multiples of the pixel stride so parallel chunk boundaries
// never split a pixel.
const RGBA_CHUNK: usize = 4 * 4096;
const RGB_CHUNK: usize = 3 * 4096;

/// Scale each channel value away from mid-gray by `gain`, clamped to 0..=255.
fn contrast_lut(gain: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, out) in lut.iter_mut().enumerate() {
        *out = ((i as f32 - 128.0) * gain + 128.0).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Apply contrast gain in place to an RGBA buffer. Alpha is untouched.
pub fn apply_contrast_rgba(pixels: &mut [u8], gain: f32) {
    if (gain - CONTRAST_NEUTRAL).abs() < PASSTHROUGH_EPS {
        return;
    }
    let lut = contrast_lut(gain);
    pixels.par_chunks_mut(RGBA_CHUNK).for_each(|chunk| {
        for px in chunk.chunks_exact_mut(4) {
            px[0] = lut[px[0] as usize];
            px[1] = lut[px[1] as usize];
            px[2] = lut[px[2] as usize];
        }
    });
}

/// Apply contrast gain in place to a packed RGB buffer.
pub fn apply_contrast_rgb(pixels: &mut [u8], gain: f32) {
    if (gain - CONTRAST_NEUTRAL).abs() < PASSTHROUGH_EPS {
        return;
    }
    let lut = contrast_lut(gain);
    pixels.par_chunks_mut(RGB_CHUNK).for_each(|chunk| {
        for b in chunk.iter_mut() {
            *b = lut[*b as usize];
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_gain_is_a_no_op() {
        let mut px = vec![0u8, 100, 200, 255, 13, 128, 250, 7];
        let before = px.clone();
        apply_contrast_rgba(&mut px, 1.0);
        assert_eq!(px, before);
    }

    #[test]
    fn gain_two_pushes_values_away_from_mid_gray() {
        let mut px = vec![0u8, 128, 200, 77];
        apply_contrast_rgba(&mut px, 2.0);
        assert_eq!(px[0], 0); // (0-128)*2+128 = -128, clamps to 0
        assert_eq!(px[1], 128); // mid-gray is the fixed point
        assert_eq!(px[2], 255); // (200-128)*2+128 = 272, clamps to 255
        assert_eq!(px[3], 77); // alpha untouched
    }

    #[test]
    fn rgb_variant_touches_every_channel() {
        let mut px = vec![64u8, 128, 192];
        apply_contrast_rgb(&mut px, 2.0);
        assert_eq!(px, vec![0, 128, 255]);
    }

    #[test]
    fn low_gain_compresses_toward_mid_gray() {
        let mut px = vec![0u8, 255, 128, 0];
        apply_contrast_rgba(&mut px, 0.5);
        assert_eq!(px[0], 64); // (0-128)*0.5+128
        assert_eq!(px[1], 192); // (255-128)*0.5+128 = 191.5, rounds to 192
        assert_eq!(px[2], 128);
    }
}
