// crates/caselens-core/src/tools/mod.rs
//
// The viewer's tool state machine.
//
// Three layers:
//   ToolMode       — which tool is armed (serialized into commands).
//   ActiveGesture  — the in-flight pointer gesture as a tagged union, so a
//                    half-finished drag can never leak into another tool.
//   ToolController — routes pointer events to the per-tool engines below and
//                    owns the mode-transition rules.
//
// Transition rules:
//   * Selecting the active mode again toggles back to View.
//   * Any mode switch cancels the in-flight gesture without committing it and
//     dismisses a pending calibration prompt.
//   * A completed region capture returns to View on its own.
//   * A committed calibration switches straight to Measure.
//
// Engines (one file per tool):
//   draw.rs      — freehand annotation strokes
//   calibrate.rs — reference line + distance input
//   measure.rs   — measurement lines against the calibration scale
//   scan.rs      — region-capture rectangles

pub mod calibrate;
pub mod draw;
pub mod measure;
pub mod scan;

use serde::{Deserialize, Serialize};

use crate::geometry::{NativePoint, NativeRect};
use crate::overlay::{OverlayState, StrokeColor};

pub use calibrate::{parse_distance_m, CalibrationInputError, PendingCalibration};

/// Lines shorter than this many native pixels are discarded on release.
/// Shared by the calibration and measurement tools.
pub const MIN_LINE_PX: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolMode {
    View,
    Draw,
    Scan,
    Calibrate,
    Measure,
}

impl ToolMode {
    pub const ALL: [ToolMode; 5] = [
        ToolMode::View,
        ToolMode::Draw,
        ToolMode::Scan,
        ToolMode::Calibrate,
        ToolMode::Measure,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolMode::View      => "View",
            ToolMode::Draw      => "Draw",
            ToolMode::Scan      => "Scan",
            ToolMode::Calibrate => "Calibrate",
            ToolMode::Measure   => "Measure",
        }
    }
}

/// The in-flight pointer gesture. Exactly one shape exists at a time; a mode
/// that does not recognize the shape on pointer-up drops it.
#[derive(Clone, Debug, PartialEq)]
pub enum ActiveGesture {
    Idle,
    Stroke { points: Vec<NativePoint> },
    Line { start: NativePoint, end: NativePoint },
    Rect { anchor: NativePoint, corner: NativePoint },
}

/// Work the app loop must pick up after a pointer-up.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolAction {
    /// Crop the current frame to this (already clamped) rect.
    CaptureRegion(NativeRect),
}

#[derive(Clone, Debug)]
pub struct ToolController {
    mode:    ToolMode,
    gesture: ActiveGesture,
    pending: Option<PendingCalibration>,
    pub stroke_color: StrokeColor,
}

impl Default for ToolController {
    fn default() -> Self {
        Self {
            mode:    ToolMode::View,
            gesture: ActiveGesture::Idle,
            pending: None,
            stroke_color: StrokeColor::Yellow,
        }
    }
}

impl ToolController {
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn gesture(&self) -> &ActiveGesture {
        &self.gesture
    }

    pub fn pending_calibration(&self) -> Option<&PendingCalibration> {
        self.pending.as_ref()
    }

    /// Select a tool. Selecting the active one toggles back to View. Either
    /// way the in-flight gesture and any pending distance prompt are dropped
    /// uncommitted.
    pub fn select_mode(&mut self, mode: ToolMode) {
        self.cancel_gesture();
        self.mode = if mode == self.mode { ToolMode::View } else { mode };
    }

    pub fn cancel_gesture(&mut self) {
        self.gesture = ActiveGesture::Idle;
        self.pending = None;
    }

    pub fn pointer_down(&mut self, p: NativePoint, overlay: &OverlayState) {
        // The distance prompt is modal; the canvas ignores pointers under it.
        if self.pending.is_some() {
            return;
        }
        self.gesture = match self.mode {
            ToolMode::View => ActiveGesture::Idle,
            ToolMode::Draw => ActiveGesture::Stroke { points: vec![p] },
            ToolMode::Calibrate => ActiveGesture::Line { start: p, end: p },
            // Measure is inert until a calibration reference exists.
            ToolMode::Measure if overlay.calibration.is_some() => {
                ActiveGesture::Line { start: p, end: p }
            }
            ToolMode::Measure => ActiveGesture::Idle,
            ToolMode::Scan => ActiveGesture::Rect { anchor: p, corner: p },
        };
    }

    pub fn pointer_move(&mut self, p: NativePoint) {
        match &mut self.gesture {
            ActiveGesture::Idle => {}
            ActiveGesture::Stroke { points } => draw::extend(points, p),
            ActiveGesture::Line { end, .. } => *end = p,
            ActiveGesture::Rect { corner, .. } => *corner = p,
        }
    }

    /// Finish the gesture at `p`. Commits to `overlay` where the tool's rules
    /// allow; degenerate gestures vanish without a trace.
    pub fn pointer_up(
        &mut self,
        p: NativePoint,
        overlay: &mut OverlayState,
        frame_w: f32,
        frame_h: f32,
    ) -> Option<ToolAction> {
        self.pointer_move(p);
        let gesture = std::mem::replace(&mut self.gesture, ActiveGesture::Idle);
        match (self.mode, gesture) {
            (ToolMode::Draw, ActiveGesture::Stroke { points }) => {
                draw::commit(points, self.stroke_color, overlay);
                None
            }
            (ToolMode::Calibrate, ActiveGesture::Line { start, end }) => {
                self.pending = calibrate::finish_line(start, end);
                None
            }
            (ToolMode::Measure, ActiveGesture::Line { start, end }) => {
                measure::commit(start, end, overlay);
                None
            }
            (ToolMode::Scan, ActiveGesture::Rect { anchor, corner }) => {
                let rect = scan::finish(anchor, corner, frame_w, frame_h);
                if rect.is_some() {
                    self.mode = ToolMode::View;
                }
                rect.map(ToolAction::CaptureRegion)
            }
            // Mode changed mid-drag, or the mode never opened a gesture.
            _ => None,
        }
    }

    /// Resolve the pending calibration with the typed distance. Returns true
    /// when a reference was committed (and the mode advanced to Measure);
    /// invalid input discards the attempt and stays in Calibrate.
    pub fn submit_calibration_distance(&mut self, input: &str, overlay: &mut OverlayState) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        match parse_distance_m(input) {
            Ok(distance_m) => {
                overlay.calibration = Some(pending.into_reference(distance_m));
                self.mode = ToolMode::Measure;
                true
            }
            Err(_) => false,
        }
    }

    pub fn cancel_calibration(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> NativePoint {
        NativePoint::new(x, y)
    }

    fn drag(
        ctrl: &mut ToolController,
        overlay: &mut OverlayState,
        from: NativePoint,
        to: NativePoint,
    ) -> Option<ToolAction> {
        ctrl.pointer_down(from, overlay);
        ctrl.pointer_move(to);
        ctrl.pointer_up(to, overlay, 1920.0, 1080.0)
    }

    fn calibrated(ctrl: &mut ToolController, overlay: &mut OverlayState) {
        // 100 px line declared as 2 m → 50 px per meter.
        ctrl.select_mode(ToolMode::Calibrate);
        drag(ctrl, overlay, p(0.0, 0.0), p(100.0, 0.0));
        assert!(ctrl.submit_calibration_distance("2.0", overlay));
    }

    #[test]
    fn selecting_active_mode_toggles_back_to_view() {
        let mut ctrl = ToolController::default();
        ctrl.select_mode(ToolMode::Draw);
        assert_eq!(ctrl.mode(), ToolMode::Draw);
        ctrl.select_mode(ToolMode::Draw);
        assert_eq!(ctrl.mode(), ToolMode::View);
    }

    #[test]
    fn mode_switch_mid_drag_discards_the_stroke() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        ctrl.select_mode(ToolMode::Draw);
        ctrl.pointer_down(p(10.0, 10.0), &overlay);
        ctrl.pointer_move(p(40.0, 40.0));
        ctrl.select_mode(ToolMode::Scan);
        ctrl.pointer_up(p(60.0, 60.0), &mut overlay, 1920.0, 1080.0);
        assert!(overlay.strokes.is_empty());
        assert!(overlay.regions.is_empty());
    }

    #[test]
    fn mode_switch_dismisses_the_distance_prompt() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        ctrl.select_mode(ToolMode::Calibrate);
        drag(&mut ctrl, &mut overlay, p(0.0, 0.0), p(80.0, 0.0));
        assert!(ctrl.pending_calibration().is_some());
        ctrl.select_mode(ToolMode::View);
        assert!(ctrl.pending_calibration().is_none());
        assert!(overlay.calibration.is_none());
    }

    #[test]
    fn zero_movement_gestures_commit_nothing() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        for mode in [ToolMode::Draw, ToolMode::Calibrate, ToolMode::Scan] {
            ctrl.select_mode(ToolMode::View);
            ctrl.select_mode(mode);
            drag(&mut ctrl, &mut overlay, p(500.0, 500.0), p(500.0, 500.0));
        }
        assert!(overlay.strokes.is_empty());
        assert!(ctrl.pending_calibration().is_none());
        assert!(overlay.regions.is_empty());

        calibrated(&mut ctrl, &mut overlay);
        drag(&mut ctrl, &mut overlay, p(500.0, 500.0), p(500.0, 500.0));
        assert!(overlay.measurements.is_empty());
    }

    #[test]
    fn draw_commits_a_stroke_with_movement() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        ctrl.select_mode(ToolMode::Draw);
        ctrl.pointer_down(p(10.0, 10.0), &overlay);
        ctrl.pointer_move(p(20.0, 15.0));
        ctrl.pointer_move(p(30.0, 25.0));
        ctrl.pointer_up(p(30.0, 25.0), &mut overlay, 1920.0, 1080.0);
        assert_eq!(overlay.strokes.len(), 1);
        assert_eq!(overlay.strokes[0].points.len(), 3);
    }

    #[test]
    fn short_calibration_line_never_prompts() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        ctrl.select_mode(ToolMode::Calibrate);
        drag(&mut ctrl, &mut overlay, p(0.0, 0.0), p(3.0, 3.0));
        assert!(ctrl.pending_calibration().is_none());
        assert_eq!(ctrl.mode(), ToolMode::Calibrate);
    }

    #[test]
    fn calibration_commit_advances_to_measure() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        calibrated(&mut ctrl, &mut overlay);
        assert_eq!(ctrl.mode(), ToolMode::Measure);
        let cal = overlay.calibration.unwrap();
        assert!((cal.scale_factor - 50.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_distance_discards_the_attempt() {
        for bad in ["", "abc", "0", "-3.5", "nan"] {
            let mut ctrl = ToolController::default();
            let mut overlay = OverlayState::default();
            ctrl.select_mode(ToolMode::Calibrate);
            drag(&mut ctrl, &mut overlay, p(0.0, 0.0), p(100.0, 0.0));
            assert!(!ctrl.submit_calibration_distance(bad, &mut overlay), "accepted {bad:?}");
            assert!(overlay.calibration.is_none());
            assert_eq!(ctrl.mode(), ToolMode::Calibrate);
            assert!(ctrl.pending_calibration().is_none());
        }
    }

    #[test]
    fn measure_is_inert_without_calibration() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        ctrl.select_mode(ToolMode::Measure);
        drag(&mut ctrl, &mut overlay, p(0.0, 0.0), p(200.0, 0.0));
        assert!(overlay.measurements.is_empty());
    }

    #[test]
    fn measurement_reads_through_the_scale_factor() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        calibrated(&mut ctrl, &mut overlay); // 100 px ↔ 2 m
        drag(&mut ctrl, &mut overlay, p(0.0, 100.0), p(75.0, 100.0));
        assert_eq!(overlay.measurements.len(), 1);
        // 75 px · 2 m / 100 px
        assert!((overlay.measurements[0].real_len_m - 1.5).abs() < 1e-6);
        assert_eq!(overlay.measurements[0].label, "1.50 m");
    }

    #[test]
    fn replacing_calibration_keeps_existing_measurements() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        calibrated(&mut ctrl, &mut overlay);
        drag(&mut ctrl, &mut overlay, p(0.0, 100.0), p(100.0, 100.0));
        let before = overlay.measurements[0].real_len_m;

        ctrl.select_mode(ToolMode::Calibrate);
        drag(&mut ctrl, &mut overlay, p(0.0, 0.0), p(100.0, 0.0));
        assert!(ctrl.submit_calibration_distance("10.0", &mut overlay));
        assert!((overlay.measurements[0].real_len_m - before).abs() < 1e-9);
    }

    #[test]
    fn completed_capture_returns_to_view_and_small_rects_do_not() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        ctrl.select_mode(ToolMode::Scan);
        let action = drag(&mut ctrl, &mut overlay, p(100.0, 100.0), p(104.0, 104.0));
        assert!(action.is_none());
        assert_eq!(ctrl.mode(), ToolMode::Scan);

        let action = drag(&mut ctrl, &mut overlay, p(100.0, 100.0), p(300.0, 260.0));
        match action {
            Some(ToolAction::CaptureRegion(rect)) => {
                assert_eq!(rect.pixel_bounds(), (100, 100, 200, 160));
            }
            other => panic!("expected a capture, got {other:?}"),
        }
        assert_eq!(ctrl.mode(), ToolMode::View);
    }

    #[test]
    fn capture_rect_is_clamped_to_the_frame() {
        let mut ctrl = ToolController::default();
        let mut overlay = OverlayState::default();
        ctrl.select_mode(ToolMode::Scan);
        let action = drag(&mut ctrl, &mut overlay, p(1800.0, 1000.0), p(2400.0, 1300.0));
        match action {
            Some(ToolAction::CaptureRegion(rect)) => {
                assert_eq!(rect.pixel_bounds(), (1800, 1000, 120, 80));
            }
            other => panic!("expected a capture, got {other:?}"),
        }
    }
}
