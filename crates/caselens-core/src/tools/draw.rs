// crates/caselens-core/src/tools/draw.rs
//
// Freehand annotation strokes. A stroke only becomes real if the pointer
// actually traveled: a press-and-release in place leaves nothing behind.

use crate::geometry::NativePoint;
use crate::overlay::{AnnotationStroke, OverlayState, StrokeColor};

/// Append the next pointer position, skipping exact repeats so a stationary
/// pointer cannot inflate the path.
pub fn extend(points: &mut Vec<NativePoint>, p: NativePoint) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

/// Commit the stroke if it has at least one point past the start.
pub fn commit(points: Vec<NativePoint>, color: StrokeColor, overlay: &mut OverlayState) {
    if points.len() < 2 {
        return;
    }
    overlay.strokes.push(AnnotationStroke { points, color });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_positions_are_not_appended() {
        let mut points = vec![NativePoint::new(5.0, 5.0)];
        extend(&mut points, NativePoint::new(5.0, 5.0));
        extend(&mut points, NativePoint::new(5.0, 5.0));
        assert_eq!(points.len(), 1);
        extend(&mut points, NativePoint::new(6.0, 5.0));
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn single_point_stroke_is_discarded() {
        let mut overlay = OverlayState::default();
        commit(vec![NativePoint::new(1.0, 1.0)], StrokeColor::Red, &mut overlay);
        assert!(overlay.strokes.is_empty());
    }

    #[test]
    fn two_point_stroke_commits_with_its_color() {
        let mut overlay = OverlayState::default();
        commit(
            vec![NativePoint::new(1.0, 1.0), NativePoint::new(9.0, 4.0)],
            StrokeColor::Cyan,
            &mut overlay,
        );
        assert_eq!(overlay.strokes.len(), 1);
        assert_eq!(overlay.strokes[0].color, StrokeColor::Cyan);
    }
}
