// crates/caselens-core/src/tools/measure.rs
//
// Measurement lines. Only meaningful once a calibration reference exists;
// the controller never opens a measure gesture without one, and commit()
// double-checks so a reset mid-drag cannot divide by nothing.

use super::MIN_LINE_PX;
use crate::geometry::{pixel_length, NativePoint};
use crate::overlay::{Measurement, OverlayState};

/// End a measurement drag. Commits a labeled measurement when the line meets
/// the minimum length and a calibration reference is present.
pub fn commit(start: NativePoint, end: NativePoint, overlay: &mut OverlayState) {
    let Some(cal) = overlay.calibration else {
        return;
    };
    let pixel_len = pixel_length(start, end);
    if pixel_len < MIN_LINE_PX {
        return;
    }
    let real_len_m = pixel_len as f64 / cal.scale_factor;
    overlay.measurements.push(Measurement {
        start,
        end,
        pixel_len,
        real_len_m,
        label: format!("{real_len_m:.2} m"),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::CalibrationReference;

    fn overlay_with_scale(px: f32, meters: f64) -> OverlayState {
        let mut overlay = OverlayState::default();
        overlay.calibration = Some(CalibrationReference::new(
            NativePoint::new(0.0, 0.0),
            NativePoint::new(px, 0.0),
            meters,
        ));
        overlay
    }

    #[test]
    fn no_calibration_means_no_measurement() {
        let mut overlay = OverlayState::default();
        commit(NativePoint::new(0.0, 0.0), NativePoint::new(500.0, 0.0), &mut overlay);
        assert!(overlay.measurements.is_empty());
    }

    #[test]
    fn short_lines_are_dropped() {
        let mut overlay = overlay_with_scale(100.0, 1.0);
        commit(NativePoint::new(0.0, 0.0), NativePoint::new(4.0, 0.0), &mut overlay);
        assert!(overlay.measurements.is_empty());
    }

    #[test]
    fn real_length_follows_the_reference() {
        // 200 px ↔ 4 m, so 50 px per meter.
        let mut overlay = overlay_with_scale(200.0, 4.0);
        commit(NativePoint::new(10.0, 10.0), NativePoint::new(10.0, 135.0), &mut overlay);
        let m = &overlay.measurements[0];
        assert!((m.pixel_len - 125.0).abs() < 1e-3);
        assert!((m.real_len_m - 2.5).abs() < 1e-6);
        assert_eq!(m.label, "2.50 m");
    }
}
