// crates/caselens-core/src/tools/calibrate.rs
//
// Calibration: drag a line along something of known length, then type that
// length in meters. The committed reference converts pixel lengths to meters
// for every later measurement.
//
// The drag and the distance input are separated in time (the prompt is a
// modal), so the half-finished state gets its own type: PendingCalibration
// holds the line while the prompt is open, and dies uncommitted if the prompt
// is dismissed or the input is invalid.

use thiserror::Error;

use super::MIN_LINE_PX;
use crate::geometry::{pixel_length, NativePoint};
use crate::overlay::CalibrationReference;

/// A finished calibration drag waiting for its real-world distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingCalibration {
    pub start:     NativePoint,
    pub end:       NativePoint,
    pub pixel_len: f32,
}

impl PendingCalibration {
    pub fn into_reference(self, distance_m: f64) -> CalibrationReference {
        CalibrationReference::new(self.start, self.end, distance_m)
    }
}

/// End the calibration drag. Lines under the minimum length are dropped
/// without prompting.
pub fn finish_line(start: NativePoint, end: NativePoint) -> Option<PendingCalibration> {
    let pixel_len = pixel_length(start, end);
    if pixel_len < MIN_LINE_PX {
        return None;
    }
    Some(PendingCalibration { start, end, pixel_len })
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CalibrationInputError {
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("distance must be a positive number of meters, got {0}")]
    NotPositive(f64),
}

/// Parse the typed distance. Accepts any positive finite decimal, meters.
pub fn parse_distance_m(input: &str) -> Result<f64, CalibrationInputError> {
    let trimmed = input.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| CalibrationInputError::NotANumber(trimmed.to_owned()))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(CalibrationInputError::NotPositive(value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_just_under_the_minimum_is_dropped() {
        let a = NativePoint::new(0.0, 0.0);
        assert!(finish_line(a, NativePoint::new(4.9, 0.0)).is_none());
        assert!(finish_line(a, NativePoint::new(5.0, 0.0)).is_some());
    }

    #[test]
    fn distance_parsing_accepts_decimals_and_whitespace() {
        assert_eq!(parse_distance_m("2.5"), Ok(2.5));
        assert_eq!(parse_distance_m("  0.30 "), Ok(0.30));
    }

    #[test]
    fn distance_parsing_rejects_garbage_and_non_positive() {
        assert!(matches!(
            parse_distance_m("two meters"),
            Err(CalibrationInputError::NotANumber(_))
        ));
        assert!(matches!(parse_distance_m(""), Err(CalibrationInputError::NotANumber(_))));
        assert!(matches!(parse_distance_m("0"), Err(CalibrationInputError::NotPositive(_))));
        assert!(matches!(parse_distance_m("-1.2"), Err(CalibrationInputError::NotPositive(_))));
        assert!(matches!(parse_distance_m("inf"), Err(CalibrationInputError::NotPositive(_))));
    }

    #[test]
    fn reference_is_pixels_per_meter() {
        let pending = finish_line(NativePoint::new(0.0, 0.0), NativePoint::new(120.0, 0.0)).unwrap();
        let reference = pending.into_reference(3.0);
        assert!((reference.scale_factor - 40.0).abs() < 1e-6);
        assert!((reference.distance_m - 3.0).abs() < 1e-12);
    }
}
