// crates/caselens-core/src/commands.rs
//
// Every user action in CaseLens is expressed as a ViewerCommand.
// Modules emit these; app.rs processes them after the UI pass.
// Adding a new feature = add a variant here + one match arm in app.rs.

use std::path::PathBuf;
use uuid::Uuid;
use crate::geometry::NativePoint;
use crate::overlay::StrokeColor;
use crate::tools::ToolMode;

#[derive(Debug, Clone)]
pub enum ViewerCommand {
    // ── Sources ──────────────────────────────────────────────────────────────
    /// Open the file picker; app.rs adds and probes whatever gets chosen.
    OpenSourcePicker,
    AddSource(PathBuf),
    SelectSource(Uuid),
    RemoveSource(Uuid),

    // ── Transport ────────────────────────────────────────────────────────────
    TogglePlay,
    SetPlayhead(f64),
    /// Nudge the playhead by `n` thirtieth-of-a-second frames (signed).
    /// Pauses playback first so the step is visible.
    StepFrames(i32),

    // ── Canvas pointer stream ────────────────────────────────────────────────
    /// Emitted by the viewer with points already mapped into native pixel
    /// space. app.rs feeds them to the tool controller; PointerUp may produce
    /// a region-capture job for the media worker.
    PointerDown(NativePoint),
    PointerMoved(NativePoint),
    PointerUp(NativePoint),

    // ── Tools ────────────────────────────────────────────────────────────────
    SelectTool(ToolMode),
    SetStrokeColor(StrokeColor),
    SetContrast(f32),
    /// The text typed into the calibration distance prompt. Invalid input is
    /// discarded silently per the calibration rules.
    SubmitCalibrationDistance(String),
    CancelCalibration,
    /// Clear strokes, calibration, measurements, and captured regions at once.
    ResetTools,

    // ── Evidence / collaborators ─────────────────────────────────────────────
    SetFrameCount(usize),
    /// Start (or re-start) the frame + audio ingest run for a source.
    BeginIngest(Uuid),
    /// Send the source's finished bundle to the reasoning collaborator.
    SubmitEvidence(Uuid),
    /// Ask the query collaborator about one captured region.
    SubmitRegionQuery { region: Uuid, query: String },

    // ── Export ───────────────────────────────────────────────────────────────
    /// Save the current frame at native resolution as PNG; app.rs opens the
    /// save dialog and hands the resolved path to the worker.
    SaveStillPicker,
    /// Save a captured region's JPEG bytes via a save dialog.
    SaveRegionPicker(Uuid),

    ClearStatus,
}
