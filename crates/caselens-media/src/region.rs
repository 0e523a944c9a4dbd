// crates/caselens-media/src/region.rs
//
// Full-resolution region capture: decode the frame under the playhead at
// native size, bake in the active contrast gain, crop the requested
// rectangle, and JPEG-compress the result for the query collaborator.

use std::path::Path;

use ffmpeg_the_third::format::Pixel;

use caselens_core::filter;
use caselens_core::geometry::NativeRect;

use crate::decode::FrameDecoder;
use crate::error::MediaError;
use crate::helpers::jpeg;

/// Decode, filter, crop, and compress one region of the frame at `timestamp`.
///
/// The returned JPEG has exactly the rectangle's pixel dimensions. The gain
/// is the one the viewer is currently baking into its texture, so the crop
/// matches what the analyst saw when they drew the rectangle.
pub fn capture_region(
    path:      &Path,
    timestamp: f64,
    rect:      &NativeRect,
    contrast:  f32,
) -> Result<Vec<u8>, MediaError> {
    let mut decoder = FrameDecoder::open(path).map_err(MediaError::unreadable)?;
    let (native_w, native_h) = decoder.native_dims();

    let mut frame = decoder
        .frame_at(timestamp, native_w, native_h, Pixel::RGB24)
        .map_err(MediaError::unreadable)?;

    filter::apply_contrast_rgb(&mut frame.data, contrast);

    let (x, y, w, h) = rect.pixel_bounds();
    let crop = crop_rgb(&frame.data, frame.width, frame.height, x, y, w, h).ok_or_else(|| {
        MediaError::unreadable(format!(
            "region {w}x{h}+{x}+{y} outside {}x{} frame",
            frame.width, frame.height,
        ))
    })?;

    jpeg::encode_rgb(&crop, w, h).map_err(MediaError::unreadable)
}

/// Copy the rows of a `w`×`h` rectangle at `(x, y)` out of a packed RGB
/// buffer. Returns `None` when the rectangle reaches outside the frame.
pub fn crop_rgb(
    data: &[u8],
    frame_w: u32,
    frame_h: u32,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
) -> Option<Vec<u8>> {
    if w == 0 || h == 0 {
        return None;
    }
    if x.checked_add(w)? > frame_w || y.checked_add(h)? > frame_h {
        return None;
    }
    if data.len() < frame_w as usize * frame_h as usize * 3 {
        return None;
    }

    let stride = frame_w as usize * 3;
    let row_bytes = w as usize * 3;
    let mut out = Vec::with_capacity(row_bytes * h as usize);
    for row in y..y + h {
        let start = row as usize * stride + x as usize * 3;
        out.extend_from_slice(&data[start..start + row_bytes]);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x3 frame where each pixel is (col, row, 9).
    fn frame_4x3() -> Vec<u8> {
        let mut data = Vec::new();
        for row in 0..3u8 {
            for col in 0..4u8 {
                data.extend_from_slice(&[col, row, 9]);
            }
        }
        data
    }

    #[test]
    fn interior_crop_picks_the_right_pixels() {
        let crop = crop_rgb(&frame_4x3(), 4, 3, 1, 1, 2, 2).unwrap();
        assert_eq!(crop, vec![
            1, 1, 9,  2, 1, 9, // row 1, cols 1..3
            1, 2, 9,  2, 2, 9, // row 2, cols 1..3
        ]);
    }

    #[test]
    fn crop_has_exactly_the_requested_dimensions() {
        let crop = crop_rgb(&frame_4x3(), 4, 3, 0, 0, 3, 2).unwrap();
        assert_eq!(crop.len(), 3 * 2 * 3);
    }

    #[test]
    fn full_frame_crop_is_identity() {
        let data = frame_4x3();
        assert_eq!(crop_rgb(&data, 4, 3, 0, 0, 4, 3).unwrap(), data);
    }

    #[test]
    fn out_of_frame_rectangles_are_refused() {
        let data = frame_4x3();
        assert!(crop_rgb(&data, 4, 3, 3, 0, 2, 1).is_none()); // x+w past right edge
        assert!(crop_rgb(&data, 4, 3, 0, 2, 1, 2).is_none()); // y+h past bottom
        assert!(crop_rgb(&data, 4, 3, 0, 0, 0, 2).is_none()); // zero width
    }
}
