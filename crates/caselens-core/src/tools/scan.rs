// crates/caselens-core/src/tools/scan.rs
//
// Region capture rectangles. The gesture side only: the actual crop runs on
// the media worker once the controller hands the rect to the app loop.

use crate::geometry::{NativePoint, NativeRect};

/// Rectangles narrower or shorter than this many native pixels are rejected.
pub const MIN_REGION_PX: u32 = 10;

/// End a region drag. Normalizes the two corners, clamps to the frame, and
/// rejects rects under the minimum in either dimension.
pub fn finish(
    anchor: NativePoint,
    corner: NativePoint,
    frame_w: f32,
    frame_h: f32,
) -> Option<NativeRect> {
    let rect = NativeRect::from_corners(anchor, corner).clamped_to(frame_w, frame_h);
    let (_, _, w, h) = rect.pixel_bounds();
    if w < MIN_REGION_PX || h < MIN_REGION_PX {
        return None;
    }
    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_rects_are_rejected_in_either_dimension() {
        let a = NativePoint::new(100.0, 100.0);
        assert!(finish(a, NativePoint::new(109.0, 300.0), 1920.0, 1080.0).is_none());
        assert!(finish(a, NativePoint::new(300.0, 109.0), 1920.0, 1080.0).is_none());
        assert!(finish(a, NativePoint::new(110.0, 110.0), 1920.0, 1080.0).is_some());
    }

    #[test]
    fn drag_direction_does_not_matter() {
        let up_left = finish(
            NativePoint::new(400.0, 300.0),
            NativePoint::new(200.0, 150.0),
            1920.0,
            1080.0,
        )
        .unwrap();
        assert_eq!(up_left.pixel_bounds(), (200, 150, 200, 150));
    }

    #[test]
    fn rect_spilling_off_frame_is_clamped_before_the_size_check() {
        // Clamping leaves a 20 x 1080 sliver, still wide enough to keep.
        let r = finish(
            NativePoint::new(1900.0, -50.0),
            NativePoint::new(2500.0, 2000.0),
            1920.0,
            1080.0,
        )
        .unwrap();
        assert_eq!(r.pixel_bounds(), (1900, 0, 20, 1080));

        // Fully off-frame collapses to zero width and is rejected.
        assert!(finish(
            NativePoint::new(2000.0, 100.0),
            NativePoint::new(2600.0, 700.0),
            1920.0,
            1080.0,
        )
        .is_none());
    }
}
