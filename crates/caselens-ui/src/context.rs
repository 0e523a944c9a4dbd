// crates/caselens-ui/src/context.rs
//
// AppContext owns all runtime handles that are NOT part of the session
// state. CaseLensApp holds one of these plus a SessionState and the panel
// modules — nothing else.
//
// Sub-struct layout:
//   AppContext
//     ├── media_worker     — the FFmpeg worker + all channel handles
//     ├── collab           — background HTTP client for the collaborator
//     ├── view / raw       — the on-screen frame texture and its raw pixels
//     └── pending_*        — in-flight async work, for staleness checks

use std::collections::{HashMap, HashSet};

use caselens_core::filter::apply_contrast_rgba;
use caselens_core::session::SessionState;
use caselens_media::{MediaResult, MediaWorker};
use eframe::egui;
use uuid::Uuid;

use crate::collab::{CollabClient, CollabResult};

/// The frame currently on the canvas, as an uploaded texture.
pub struct ViewTexture {
    pub texture:   egui::TextureHandle,
    pub source_id: Uuid,
    pub timestamp: f64,
}

/// Raw pixels of the on-screen frame, kept so a contrast change re-bakes
/// without another decode round-trip.
struct RawFrame {
    source_id: Uuid,
    timestamp: f64,
    width:     u32,
    height:    u32,
    rgba:      Vec<u8>,
}

pub struct AppContext {
    pub media_worker: MediaWorker,
    pub collab:       CollabClient,

    pub view: Option<ViewTexture>,
    raw:      Option<RawFrame>,

    /// Region captures in flight. "Reset tools" clears this set so a late
    /// capture cannot resurrect a cleared region.
    pub pending_regions: HashSet<Uuid>,

    /// Evidence submissions in flight: source id → generation submitted.
    /// A report tagged with any other generation is stale and dropped.
    pub pending_reports: HashMap<Uuid, u64>,

    /// Region queries in flight (disables the Ask button per region).
    pub pending_answers: HashSet<Uuid>,

    /// Bumped each time a source's evidence bundle is replaced; part of the
    /// `bytes://` URI so the image loader never serves a stale still.
    bundle_revs: HashMap<Uuid, u64>,

    /// Last scrub request issued; identical repeats are skipped.
    last_request: Option<(Uuid, f64)>,
}

pub fn evidence_uri(source_id: Uuid, rev: u64, index: usize) -> String {
    format!("bytes://evidence/{source_id}/{rev}/{index}.jpg")
}

pub fn region_uri(region_id: Uuid) -> String {
    format!("bytes://region/{region_id}.jpg")
}

impl AppContext {
    pub fn new(media_worker: MediaWorker, collab: CollabClient) -> Self {
        Self {
            media_worker,
            collab,
            view: None,
            raw: None,
            pending_regions: HashSet::new(),
            pending_reports: HashMap::new(),
            pending_answers: HashSet::new(),
            bundle_revs: HashMap::new(),
            last_request: None,
        }
    }

    pub fn bundle_rev(&self, source_id: Uuid) -> u64 {
        self.bundle_revs.get(&source_id).copied().unwrap_or(0)
    }

    // ── Canvas frame ────────────────────────────────────────────────────────

    /// Ask the scrub thread for the frame under the playhead. Deduped:
    /// calling this every update is free while nothing moved.
    pub fn sync_view(&mut self, state: &SessionState) {
        let Some(src) = state.active_source() else {
            self.view = None;
            self.raw = None;
            self.last_request = None;
            return;
        };
        // Hold off until the probe answers; a failed source never decodes.
        if src.info.is_none() {
            return;
        }
        let want = (src.id, state.playhead);
        let same = self
            .last_request
            .map(|(id, ts)| id == want.0 && (ts - want.1).abs() < 1e-9)
            .unwrap_or(false);
        if same {
            return;
        }
        self.last_request = Some(want);
        self.media_worker
            .request_frame(src.id, src.path.clone(), state.playhead);
    }

    fn show_frame(
        &mut self,
        state: &SessionState,
        egui_ctx: &egui::Context,
        id: Uuid,
        timestamp: f64,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) {
        // A decode that outlived a source switch is dropped here.
        if state.active != Some(id) {
            return;
        }
        let mut baked = rgba.clone();
        apply_contrast_rgba(&mut baked, state.contrast);
        let texture = egui_ctx.load_texture(
            format!("view-{id}"),
            egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], &baked),
            egui::TextureOptions::LINEAR,
        );
        self.view = Some(ViewTexture { texture, source_id: id, timestamp });
        self.raw = Some(RawFrame { source_id: id, timestamp, width, height, rgba });
    }

    /// Re-uploads the current frame with a new contrast gain. No decode: the
    /// raw pixels are kept on the CPU side exactly for this.
    pub fn rebake_contrast(&mut self, contrast: f32, egui_ctx: &egui::Context) {
        let Some(raw) = &self.raw else { return };
        let mut baked = raw.rgba.clone();
        apply_contrast_rgba(&mut baked, contrast);
        let texture = egui_ctx.load_texture(
            format!("view-{}", raw.source_id),
            egui::ColorImage::from_rgba_unmultiplied(
                [raw.width as usize, raw.height as usize],
                &baked,
            ),
            egui::TextureOptions::LINEAR,
        );
        self.view = Some(ViewTexture {
            texture,
            source_id: raw.source_id,
            timestamp: raw.timestamp,
        });
    }

    /// Drops the image-loader entries for a source's evidence stills.
    /// Call before the bundle is replaced or the source removed.
    pub fn forget_evidence_images(
        &self,
        egui_ctx: &egui::Context,
        source_id: Uuid,
        frame_count: usize,
    ) {
        let rev = self.bundle_rev(source_id);
        for i in 0..frame_count {
            egui_ctx.forget_image(&evidence_uri(source_id, rev, i));
        }
    }

    // ── Result ingestion ────────────────────────────────────────────────────

    /// Drains every async channel once. Called at the top of each update,
    /// before any panel reads the state.
    pub fn ingest_results(&mut self, state: &mut SessionState, egui_ctx: &egui::Context) {
        // Scrub frames first so the canvas is current before panels draw.
        while let Ok(result) = self.media_worker.scrub_rx.try_recv() {
            if let MediaResult::ViewFrame { id, timestamp, width, height, data } = result {
                self.show_frame(state, egui_ctx, id, timestamp, width, height, data);
                egui_ctx.request_repaint();
            }
        }

        while let Ok(result) = self.media_worker.rx.try_recv() {
            self.apply_media_result(state, egui_ctx, result);
            egui_ctx.request_repaint();
        }

        while let Ok(result) = self.collab.rx.try_recv() {
            self.apply_collab_result(state, result);
            egui_ctx.request_repaint();
        }
    }

    fn apply_media_result(
        &mut self,
        state: &mut SessionState,
        egui_ctx: &egui::Context,
        result: MediaResult,
    ) {
        match result {
            MediaResult::SourceProbed { id, info } => {
                if let Some(src) = state.source_mut(id) {
                    tracing::info!(
                        "probed {}: {}x{} {:.2}s",
                        src.name, info.width, info.height, info.duration_secs
                    );
                    src.info = Some(info);
                    src.probe_error = None;
                }
            }
            MediaResult::SourceFailed { id, error } => {
                if let Some(src) = state.source_mut(id) {
                    tracing::warn!("probe failed for {}: {error}", src.name);
                    src.probe_error = Some(error);
                }
            }
            MediaResult::IngestProgress { id, generation, done, total } => {
                state.apply_ingest_progress(id, generation, done, total);
            }
            MediaResult::IngestDone { id, generation, bundle } => {
                let prior = state.evidence.get(&id).map(|b| b.frames.len()).unwrap_or(0);
                if state.apply_ingest_done(id, generation, bundle) {
                    self.forget_evidence_images(egui_ctx, id, prior);
                    *self.bundle_revs.entry(id).or_insert(0) += 1;
                    // Hand the stills to the image loader once; panels render
                    // them by URI from here on.
                    let rev = self.bundle_rev(id);
                    if let Some(bundle) = state.evidence.get(&id) {
                        for (i, frame) in bundle.frames.iter().enumerate() {
                            egui_ctx.include_bytes(evidence_uri(id, rev, i), frame.jpeg.clone());
                        }
                    }
                } else {
                    tracing::debug!("dropping ingest bundle from a superseded run");
                }
            }
            MediaResult::IngestFailed { id, generation, error } => {
                if state.apply_ingest_failure(id, generation, error.clone()) {
                    state.status_line = Some(format!("Ingest failed: {error}"));
                }
            }
            MediaResult::RegionReady { region } => {
                // Reset-tools while the crop was in flight unregisters it.
                if self.pending_regions.remove(&region.id) {
                    egui_ctx.include_bytes(region_uri(region.id), region.jpeg.clone());
                    state.overlay.regions.push(*region);
                } else {
                    tracing::debug!("dropping capture for a cleared region");
                }
            }
            MediaResult::RegionFailed { region_id, error } => {
                self.pending_regions.remove(&region_id);
                state.status_line = Some(format!("Region capture failed: {error}"));
            }
            MediaResult::StillSaved { path } => {
                state.status_line = Some(format!("Saved {}", path.display()));
            }
            MediaResult::StillFailed { error } => {
                state.status_line = Some(format!("Still export failed: {error}"));
            }
            // Scrub frames normally arrive on their own channel; route one
            // here all the same.
            MediaResult::ViewFrame { id, timestamp, width, height, data } => {
                self.show_frame(state, egui_ctx, id, timestamp, width, height, data);
            }
        }
    }

    fn apply_collab_result(&mut self, state: &mut SessionState, result: CollabResult) {
        match result {
            CollabResult::Report { source_id, generation, text } => {
                let current = self.pending_reports.get(&source_id) == Some(&generation);
                if current && state.source(source_id).is_some() {
                    self.pending_reports.remove(&source_id);
                    state.reports.insert(source_id, text);
                    state.status_line = Some("Collaborator report received".into());
                } else {
                    tracing::debug!("dropping stale collaborator report");
                }
            }
            CollabResult::ReportFailed { source_id, generation, error } => {
                if self.pending_reports.get(&source_id) == Some(&generation) {
                    self.pending_reports.remove(&source_id);
                    state.status_line = Some(format!("Evidence submission failed: {error}"));
                }
            }
            CollabResult::Answer { region_id, answer } => {
                self.pending_answers.remove(&region_id);
                if let Some(region) = state.overlay.region_mut(region_id) {
                    region.answer = Some(answer);
                } else {
                    tracing::debug!("dropping answer for a cleared region");
                }
            }
            CollabResult::AnswerFailed { region_id, error } => {
                self.pending_answers.remove(&region_id);
                state.status_line = Some(format!("Region query failed: {error}"));
            }
        }
    }
}
