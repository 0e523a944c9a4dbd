// crates/caselens-core/src/session.rs
//
// The whole viewer session as one value. The app loop owns it, panels read
// it and emit ViewerCommands; nothing else writes it. Media results are
// applied through the apply_* methods so the staleness rules live in one
// place.
//
// Nothing here persists across restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::filter::CONTRAST_NEUTRAL;
use crate::geometry::{FALLBACK_NATIVE_H, FALLBACK_NATIVE_W};
use crate::media_types::{EvidenceBundle, SourceInfo};
use crate::overlay::OverlayState;
use crate::tools::ToolController;

/// Default number of stills per ingest run. The evidence panel lets the
/// analyst pick 2..=24.
pub const DEFAULT_FRAME_COUNT: usize = 8;
pub const MIN_FRAME_COUNT: usize = 2;
pub const MAX_FRAME_COUNT: usize = 24;

/// Seek step for the frame-step buttons.
pub const FRAME_STEP_SECS: f64 = 1.0 / 30.0;

/// One loaded video source.
#[derive(Clone, Debug)]
pub struct VideoSource {
    pub id:          Uuid,
    pub path:        PathBuf,
    pub name:        String,
    /// None until the probe answers (or fails).
    pub info:        Option<SourceInfo>,
    pub probe_error: Option<String>,
}

/// Where a source's ingest run stands. `Running` remembers the generation it
/// was launched under so results from an abandoned run can be recognized.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum IngestStatus {
    #[default]
    Idle,
    Running { generation: u64, done: usize, total: usize },
    Failed(String),
    Ready,
}

pub struct SessionState {
    pub sources:     Vec<VideoSource>,
    pub active:      Option<Uuid>,
    pub playhead:    f64,
    pub playing:     bool,
    pub contrast:    f32,
    pub frame_count: usize,
    pub tools:       ToolController,
    pub overlay:     OverlayState,
    pub evidence:    HashMap<Uuid, EvidenceBundle>,
    pub ingest:      HashMap<Uuid, IngestStatus>,
    /// Verbatim report text per source, as returned by the collaborator.
    pub reports:     HashMap<Uuid, String>,
    pub status_line: Option<String>,
    generation:      u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            sources:     Vec::new(),
            active:      None,
            playhead:    0.0,
            playing:     false,
            contrast:    CONTRAST_NEUTRAL,
            frame_count: DEFAULT_FRAME_COUNT,
            tools:       ToolController::default(),
            overlay:     OverlayState::default(),
            evidence:    HashMap::new(),
            ingest:      HashMap::new(),
            reports:     HashMap::new(),
            status_line: None,
            generation:  0,
        }
    }
}

impl SessionState {
    // ── Sources ─────────────────────────────────────────────────────────────

    /// Add a source unless the same path is already loaded. The first source
    /// becomes active automatically. Returns the new id, or None on a dup.
    pub fn add_source(&mut self, path: &Path) -> Option<Uuid> {
        if self.sources.iter().any(|s| s.path == path) {
            return None;
        }
        let id = Uuid::new_v4();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.sources.push(VideoSource {
            id,
            path: path.to_path_buf(),
            name,
            info: None,
            probe_error: None,
        });
        if self.active.is_none() {
            self.active = Some(id);
        }
        Some(id)
    }

    pub fn remove_source(&mut self, id: Uuid) {
        self.sources.retain(|s| s.id != id);
        self.evidence.remove(&id);
        self.ingest.remove(&id);
        self.reports.remove(&id);
        if self.active == Some(id) {
            self.active = self.sources.first().map(|s| s.id);
            self.playhead = 0.0;
            self.playing = false;
        }
    }

    pub fn source(&self, id: Uuid) -> Option<&VideoSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn source_mut(&mut self, id: Uuid) -> Option<&mut VideoSource> {
        self.sources.iter_mut().find(|s| s.id == id)
    }

    pub fn active_source(&self) -> Option<&VideoSource> {
        self.active.and_then(|id| self.source(id))
    }

    /// Duration of the active source, 0.0 while unprobed.
    pub fn duration(&self) -> f64 {
        self.active_source()
            .and_then(|s| s.info.as_ref())
            .map(|i| i.duration_secs)
            .unwrap_or(0.0)
    }

    /// Intrinsic dimensions of the active source, falling back to a nominal
    /// size until the probe answers.
    pub fn native_dims(&self) -> (u32, u32) {
        self.active_source()
            .and_then(|s| s.info.as_ref())
            .map(|i| (i.width, i.height))
            .unwrap_or((FALLBACK_NATIVE_W, FALLBACK_NATIVE_H))
    }

    // ── Transport ───────────────────────────────────────────────────────────

    pub fn set_playhead(&mut self, secs: f64) {
        let dur = self.duration();
        self.playhead = if dur > 0.0 { secs.clamp(0.0, dur) } else { 0.0 };
    }

    /// Advance the playhead by wall-clock `dt` while playing; stop at the end.
    pub fn tick_playback(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        let dur = self.duration();
        self.playhead += dt;
        if self.playhead >= dur {
            self.playhead = dur;
            self.playing = false;
        }
    }

    // ── Ingest bookkeeping ──────────────────────────────────────────────────

    /// Mint the generation for a new ingest run and mark it running. Any
    /// result still in flight from an earlier run of this source is stale
    /// from here on.
    pub fn begin_ingest(&mut self, id: Uuid, total: usize) -> u64 {
        self.generation += 1;
        self.ingest.insert(
            id,
            IngestStatus::Running { generation: self.generation, done: 0, total },
        );
        self.generation
    }

    pub fn ingest_status(&self, id: Uuid) -> IngestStatus {
        self.ingest.get(&id).cloned().unwrap_or_default()
    }

    fn run_matches(&self, id: Uuid, generation: u64) -> bool {
        matches!(
            self.ingest.get(&id),
            Some(IngestStatus::Running { generation: g, .. }) if *g == generation
        )
    }

    pub fn apply_ingest_progress(&mut self, id: Uuid, generation: u64, done: usize, total: usize) {
        if self.run_matches(id, generation) {
            self.ingest
                .insert(id, IngestStatus::Running { generation, done, total });
        }
    }

    /// Accept a finished bundle, or drop it when the run it came from is no
    /// longer current. Returns whether it was applied.
    pub fn apply_ingest_done(&mut self, id: Uuid, generation: u64, bundle: EvidenceBundle) -> bool {
        if !self.run_matches(id, generation) {
            return false;
        }
        self.evidence.insert(id, bundle);
        self.ingest.insert(id, IngestStatus::Ready);
        true
    }

    pub fn apply_ingest_failure(&mut self, id: Uuid, generation: u64, error: String) -> bool {
        if !self.run_matches(id, generation) {
            return false;
        }
        self.ingest.insert(id, IngestStatus::Failed(error));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_types::FrameSample;

    fn bundle_of(n: usize) -> EvidenceBundle {
        EvidenceBundle {
            frames: (0..n)
                .map(|i| FrameSample { timestamp_secs: i as f64, jpeg: vec![0u8; 4] })
                .collect(),
            audio:  None,
        }
    }

    #[test]
    fn duplicate_paths_are_not_added_twice() {
        let mut s = SessionState::default();
        let first = s.add_source(Path::new("/footage/cam-01.mp4"));
        assert!(first.is_some());
        assert!(s.add_source(Path::new("/footage/cam-01.mp4")).is_none());
        assert_eq!(s.sources.len(), 1);
        assert_eq!(s.active, first);
        assert_eq!(s.sources[0].name, "cam-01.mp4");
    }

    #[test]
    fn removing_the_active_source_falls_back_to_the_first() {
        let mut s = SessionState::default();
        let a = s.add_source(Path::new("/a.mp4")).unwrap();
        let b = s.add_source(Path::new("/b.mp4")).unwrap();
        s.active = Some(b);
        s.remove_source(b);
        assert_eq!(s.active, Some(a));
        assert!(s.evidence.get(&b).is_none());
    }

    #[test]
    fn stale_ingest_results_are_dropped() {
        let mut s = SessionState::default();
        let id = s.add_source(Path::new("/a.mp4")).unwrap();
        let old_gen = s.begin_ingest(id, 5);
        let new_gen = s.begin_ingest(id, 8);
        assert!(new_gen > old_gen);

        assert!(!s.apply_ingest_done(id, old_gen, bundle_of(5)));
        assert!(s.evidence.get(&id).is_none());

        assert!(s.apply_ingest_done(id, new_gen, bundle_of(8)));
        assert_eq!(s.evidence.get(&id).unwrap().frames.len(), 8);
        assert_eq!(s.ingest_status(id), IngestStatus::Ready);
    }

    #[test]
    fn results_for_a_removed_source_are_dropped() {
        let mut s = SessionState::default();
        let id = s.add_source(Path::new("/a.mp4")).unwrap();
        let generation = s.begin_ingest(id, 4);
        s.remove_source(id);
        assert!(!s.apply_ingest_done(id, generation, bundle_of(4)));
    }

    #[test]
    fn failure_is_recorded_and_a_rerun_is_possible() {
        let mut s = SessionState::default();
        let id = s.add_source(Path::new("/a.mp4")).unwrap();
        let generation = s.begin_ingest(id, 4);
        assert!(s.apply_ingest_failure(id, generation, "no video stream".into()));
        assert_eq!(s.ingest_status(id), IngestStatus::Failed("no video stream".into()));

        let retry = s.begin_ingest(id, 4);
        assert!(s.apply_ingest_done(id, retry, bundle_of(4)));
    }

    #[test]
    fn playback_stops_at_the_end() {
        let mut s = SessionState::default();
        let id = s.add_source(Path::new("/a.mp4")).unwrap();
        s.source_mut(id).unwrap().info =
            Some(SourceInfo { duration_secs: 10.0, width: 1280, height: 720 });
        s.playing = true;
        s.playhead = 9.5;
        s.tick_playback(0.7);
        assert!((s.playhead - 10.0).abs() < 1e-9);
        assert!(!s.playing);
    }
}
