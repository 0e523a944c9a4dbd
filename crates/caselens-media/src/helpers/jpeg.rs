// crates/caselens-media/src/helpers/jpeg.rs
//
// Shared JPEG encoding for evidence stills and region crops.

use anyhow::Result;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

/// Compression quality for everything sent to collaborators (0..=100).
pub const JPEG_QUALITY: u8 = 70;

/// Encode a tightly packed RGB buffer at the shared evidence quality.
pub fn encode_rgb(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode(rgb, width, height, ExtendedColorType::Rgb8)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_a_valid_jpeg_header() {
        let rgb = vec![127u8; 16 * 16 * 3];
        let jpeg = encode_rgb(&rgb, 16, 16).unwrap();
        // SOI marker.
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert!(jpeg.len() > 100);
    }
}
