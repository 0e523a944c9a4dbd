// crates/caselens-core/src/overlay.rs
//
// Overlay elements drawn on top of the footage: freehand strokes, the
// calibration reference, measurements, and captured regions.
//
// One overlay set per session (not per source). Elements live until
// "reset tools" clears them all at once.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contracts::RegionAnswer;
use crate::geometry::{pixel_length, NativePoint, NativeRect};

/// Color tag carried by each stroke. Rendering colors live in the UI theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrokeColor {
    Yellow,
    Red,
    Cyan,
    Green,
}

impl StrokeColor {
    pub const ALL: [StrokeColor; 4] = [
        StrokeColor::Yellow,
        StrokeColor::Red,
        StrokeColor::Cyan,
        StrokeColor::Green,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StrokeColor::Yellow => "Yellow",
            StrokeColor::Red    => "Red",
            StrokeColor::Cyan   => "Cyan",
            StrokeColor::Green  => "Green",
        }
    }
}

/// A committed freehand stroke: the pointer path in native pixels.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnotationStroke {
    pub points: Vec<NativePoint>,
    pub color:  StrokeColor,
}

/// The calibration line binding a pixel length to a real-world distance.
/// At most one exists; committing a new one replaces it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CalibrationReference {
    pub start:        NativePoint,
    pub end:          NativePoint,
    pub pixel_len:    f32,
    pub distance_m:   f64,
    /// Native pixels per meter.
    pub scale_factor: f64,
}

impl CalibrationReference {
    pub fn new(start: NativePoint, end: NativePoint, distance_m: f64) -> Self {
        let pixel_len = pixel_length(start, end);
        Self {
            start,
            end,
            pixel_len,
            distance_m,
            scale_factor: pixel_len as f64 / distance_m,
        }
    }
}

/// A committed measurement. `real_len_m` is fixed at commit time; replacing
/// the calibration reference afterwards does not rescale it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Measurement {
    pub start:      NativePoint,
    pub end:        NativePoint,
    pub pixel_len:  f32,
    pub real_len_m: f64,
    pub label:      String,
}

/// A captured region: the crop rectangle, when it was taken, and the
/// full-resolution JPEG crop the worker produced. Immutable once recorded
/// except for the collaborator answer landing later.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub id:       Uuid,
    pub rect:     NativeRect,
    pub taken_at: f64,
    pub jpeg:     Vec<u8>,
    pub answer:   Option<RegionAnswer>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OverlayState {
    pub strokes:      Vec<AnnotationStroke>,
    pub calibration:  Option<CalibrationReference>,
    pub measurements: Vec<Measurement>,
    pub regions:      Vec<RegionOfInterest>,
}

impl OverlayState {
    /// "Reset tools": drop every overlay element, including the calibration
    /// reference and all captured regions.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
            && self.calibration.is_none()
            && self.measurements.is_empty()
            && self.regions.is_empty()
    }

    pub fn region_mut(&mut self, id: Uuid) -> Option<&mut RegionOfInterest> {
        self.regions.iter_mut().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_scale_factor_is_pixels_per_meter() {
        let r = CalibrationReference::new(
            NativePoint::new(0.0, 0.0),
            NativePoint::new(300.0, 400.0),
            2.5,
        );
        assert!((r.pixel_len - 500.0).abs() < 1e-3);
        assert!((r.scale_factor - 200.0).abs() < 1e-6);
    }

    #[test]
    fn reset_clears_every_element() {
        let mut overlay = OverlayState::default();
        overlay.strokes.push(AnnotationStroke {
            points: vec![NativePoint::new(0.0, 0.0), NativePoint::new(1.0, 1.0)],
            color:  StrokeColor::Red,
        });
        overlay.calibration = Some(CalibrationReference::new(
            NativePoint::new(0.0, 0.0),
            NativePoint::new(10.0, 0.0),
            1.0,
        ));
        overlay.reset();
        assert!(overlay.is_empty());
    }
}
