// crates/caselens-ui/src/app.rs
use caselens_core::commands::ViewerCommand;
use caselens_core::contracts::{EvidencePackage, RegionQuery};
use caselens_core::filter::{CONTRAST_MAX, CONTRAST_MIN};
use caselens_core::session::{SessionState, FRAME_STEP_SECS, MAX_FRAME_COUNT, MIN_FRAME_COUNT};
use caselens_core::tools::{ToolAction, ToolMode};
use caselens_media::MediaWorker;
use crate::collab::CollabClient;
use crate::config::CollabConfig;
use crate::context::{region_uri, AppContext};
use crate::modules::{
    canvas::CanvasModule,
    evidence::EvidenceModule,
    inspector::InspectorModule,
    sources::{SourcesModule, VIDEO_EXTENSIONS},
    ViewerModule,
};
use crate::theme::configure_style;
use eframe::egui;
use rfd::FileDialog;
use uuid::Uuid;

// ── App ───────────────────────────────────────────────────────────────────────

pub struct CaseLensApp {
    state:        SessionState,
    context:      AppContext,
    // Panel modules as concrete types — eliminates per-frame name-string lookup
    // and makes typos a compile error instead of a silently blank panel.
    sources:      SourcesModule,
    canvas:       CanvasModule,
    evidence:     EvidenceModule,
    inspector:    InspectorModule,
    /// Commands emitted by modules each frame, processed after the UI pass
    pending_cmds: Vec<ViewerCommand>,
}

impl CaseLensApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        configure_style(&cc.egui_ctx);
        // Pin to dark mode — prevents egui overwriting our theme on OS light/dark changes.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let media_worker = MediaWorker::new();
        let collab = CollabClient::new(CollabConfig::from_env());
        if !collab.is_configured() {
            tracing::info!("CASELENS_COLLAB_URL not set; evidence submission disabled");
        }

        Self {
            state:        SessionState::default(),
            context:      AppContext::new(media_worker, collab),
            sources:      SourcesModule,
            canvas:       CanvasModule::default(),
            evidence:     EvidenceModule,
            inspector:    InspectorModule::default(),
            pending_cmds: Vec::new(),
        }
    }

    fn add_source(&mut self, path: std::path::PathBuf) {
        if let Some(id) = self.state.add_source(&path) {
            self.context.media_worker.probe_source(id, path);
        }
    }

    fn process_command(&mut self, cmd: ViewerCommand, ctx: &egui::Context) {
        match cmd {
            // ── Sources ──────────────────────────────────────────────────────
            ViewerCommand::OpenSourcePicker => {
                if let Some(paths) = FileDialog::new()
                    .add_filter("Video", &VIDEO_EXTENSIONS)
                    .pick_files()
                {
                    for path in paths {
                        self.add_source(path);
                    }
                }
            }
            ViewerCommand::AddSource(path) => {
                self.add_source(path);
            }
            ViewerCommand::SelectSource(id) => {
                if self.state.active != Some(id) && self.state.source(id).is_some() {
                    self.state.active   = Some(id);
                    self.state.playhead = 0.0;
                    self.state.playing  = false;
                }
            }
            ViewerCommand::RemoveSource(id) => {
                self.context.media_worker.cancel_ingest(id);
                let count = self.state.evidence.get(&id).map(|b| b.frames.len()).unwrap_or(0);
                self.context.forget_evidence_images(ctx, id, count);
                self.context.pending_reports.remove(&id);
                self.state.remove_source(id);
            }

            // ── Playback ─────────────────────────────────────────────────────
            ViewerCommand::TogglePlay => {
                let dur = self.state.duration();
                if dur > 0.0 {
                    if !self.state.playing && self.state.playhead >= dur - 0.1 {
                        self.state.playhead = 0.0;
                    }
                    self.state.playing = !self.state.playing;
                }
            }
            ViewerCommand::SetPlayhead(t) => {
                self.state.set_playhead(t);
            }
            ViewerCommand::StepFrames(n) => {
                self.state.playing = false;
                let t = self.state.playhead + n as f64 * FRAME_STEP_SECS;
                self.state.set_playhead(t);
            }

            // ── Pointer stream (already in native pixels) ────────────────────
            ViewerCommand::PointerDown(p) => {
                let SessionState { tools, overlay, .. } = &mut self.state;
                tools.pointer_down(p, overlay);
            }
            ViewerCommand::PointerMoved(p) => {
                self.state.tools.pointer_move(p);
            }
            ViewerCommand::PointerUp(p) => {
                let (nw, nh) = self.state.native_dims();
                let action = {
                    let SessionState { tools, overlay, .. } = &mut self.state;
                    tools.pointer_up(p, overlay, nw as f32, nh as f32)
                };
                if let Some(ToolAction::CaptureRegion(rect)) = action {
                    if let Some(src) = self.state.active_source() {
                        let region_id = Uuid::new_v4();
                        self.context.pending_regions.insert(region_id);
                        self.context.media_worker.capture_region(
                            region_id,
                            src.path.clone(),
                            self.state.playhead,
                            rect,
                            self.state.contrast,
                        );
                    }
                }
            }

            // ── Tools ────────────────────────────────────────────────────────
            ViewerCommand::SelectTool(mode) => {
                self.state.tools.select_mode(mode);
            }
            ViewerCommand::SetStrokeColor(color) => {
                self.state.tools.stroke_color = color;
            }
            ViewerCommand::SetContrast(gain) => {
                let gain = gain.clamp(CONTRAST_MIN, CONTRAST_MAX);
                self.state.contrast = gain;
                self.context.rebake_contrast(gain, ctx);
            }
            ViewerCommand::SubmitCalibrationDistance(text) => {
                let committed = {
                    let SessionState { tools, overlay, .. } = &mut self.state;
                    tools.submit_calibration_distance(&text, overlay)
                };
                if committed {
                    if let Some(c) = &self.state.overlay.calibration {
                        self.state.status_line =
                            Some(format!("Scale set: {:.1} px/m", c.scale_factor));
                    }
                } else {
                    tracing::debug!("calibration input rejected: {text:?}");
                }
            }
            ViewerCommand::CancelCalibration => {
                self.state.tools.cancel_calibration();
            }
            ViewerCommand::ResetTools => {
                for r in &self.state.overlay.regions {
                    ctx.forget_image(&region_uri(r.id));
                }
                // select_mode drops any in-flight gesture and open prompt.
                self.state.tools.select_mode(ToolMode::View);
                self.state.overlay.reset();
                self.context.pending_regions.clear();
                self.context.pending_answers.clear();
                self.state.status_line = Some("Tools reset".into());
            }

            // ── Evidence ─────────────────────────────────────────────────────
            ViewerCommand::SetFrameCount(n) => {
                self.state.frame_count = n.clamp(MIN_FRAME_COUNT, MAX_FRAME_COUNT);
            }
            ViewerCommand::BeginIngest(id) => {
                let probed = self.state.source(id).and_then(|s| {
                    s.info.as_ref().map(|i| (s.path.clone(), i.duration_secs))
                });
                if let Some((path, duration)) = probed {
                    self.context.media_worker.cancel_ingest(id);
                    let count      = self.state.frame_count;
                    let generation = self.state.begin_ingest(id, count);
                    self.context
                        .media_worker
                        .start_ingest(id, generation, path, duration, count);
                }
            }
            ViewerCommand::SubmitEvidence(id) => {
                let payload = self.state.source(id).and_then(|src| {
                    self.state.evidence.get(&id).map(|bundle| {
                        let duration = src.info.as_ref().map(|i| i.duration_secs).unwrap_or(0.0);
                        EvidencePackage::from_bundle(&src.name, duration, bundle)
                    })
                });
                if let Some(package) = payload {
                    // Tagged with the bundle revision so a re-ingest invalidates
                    // the report that was requested for the old stills.
                    let rev = self.context.bundle_rev(id);
                    self.context.pending_reports.insert(id, rev);
                    self.context.collab.submit_evidence(id, rev, package);
                }
            }
            ViewerCommand::SubmitRegionQuery { region, query } => {
                let payload = self
                    .state
                    .overlay
                    .regions
                    .iter()
                    .find(|r| r.id == region)
                    .map(|r| RegionQuery::for_region(r, &query));
                if let Some(q) = payload {
                    self.context.pending_answers.insert(region);
                    self.context.collab.submit_region_query(region, q);
                }
            }

            // ── Exports ──────────────────────────────────────────────────────
            ViewerCommand::SaveStillPicker => {
                let Some(src) = self.state.active_source() else { return };
                let stem = src
                    .path
                    .file_stem()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                let ts_label     = format!("{:.3}", self.state.playhead).replace('.', "_");
                let default_name = format!("{stem}_t{ts_label}.png");

                if let Some(dest) = FileDialog::new()
                    .set_file_name(&default_name)
                    .add_filter("PNG", &["png"])
                    .save_file()
                {
                    self.context.media_worker.save_still(
                        src.path.clone(),
                        self.state.playhead,
                        self.state.contrast,
                        dest,
                    );
                }
            }
            ViewerCommand::SaveRegionPicker(id) => {
                let Some(r) = self.state.overlay.regions.iter().find(|r| r.id == id) else {
                    return;
                };
                let ts_label     = format!("{:.2}", r.taken_at).replace('.', "_");
                let default_name = format!("region_t{ts_label}.jpg");

                if let Some(dest) = FileDialog::new()
                    .set_file_name(&default_name)
                    .add_filter("JPEG", &["jpg"])
                    .save_file()
                {
                    let written = std::fs::write(&dest, &r.jpeg);
                    self.state.status_line = Some(match written {
                        Ok(())  => format!("Saved {}", dest.display()),
                        Err(e)  => format!("Save failed: {e}"),
                    });
                }
            }

            // ── UI ───────────────────────────────────────────────────────────
            ViewerCommand::ClearStatus => {
                self.state.status_line = None;
            }
        }
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let files = ctx.input(|i| i.raw.dropped_files.clone());
        for file in files {
            if let Some(path) = file.path {
                self.add_source(path);
            }
        }
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for CaseLensApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.context.media_worker.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_drag_and_drop(ctx);
        self.context.ingest_results(&mut self.state, ctx);

        egui::TopBottomPanel::top("top_panel")
            .exact_height(36.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("🔍 CaseLens")
                            .strong().size(15.0).color(crate::theme::ACCENT),
                    );
                    ui.separator();
                    match &self.state.status_line {
                        Some(msg) => {
                            ui.label(egui::RichText::new(msg.as_str()).size(12.0));
                            if ui.small_button("✕").clicked() {
                                self.pending_cmds.push(ViewerCommand::ClearStatus);
                            }
                        }
                        None => {
                            ui.label(
                                egui::RichText::new("Drop footage to inspect").size(12.0).weak(),
                            );
                        }
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if !self.context.collab.is_configured() {
                            ui.label(
                                egui::RichText::new("collaborator link not set")
                                    .size(10.0)
                                    .color(crate::theme::DARK_TEXT_DIM),
                            );
                        }
                    });
                });
            });

        egui::TopBottomPanel::bottom("evidence_panel")
            .resizable(true)
            .min_height(150.0)
            .default_height(200.0)
            .show(ctx, |ui| {
                self.evidence.ui(ui, &self.state, &mut self.context, &mut self.pending_cmds);
            });

        egui::SidePanel::left("sources_panel")
            .resizable(true)
            .default_width(230.0)
            .min_width(170.0)
            .show(ctx, |ui| {
                self.sources.ui(ui, &self.state, &mut self.context, &mut self.pending_cmds);
            });

        egui::SidePanel::right("inspector_panel")
            .resizable(true)
            .default_width(250.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                self.inspector.ui(ui, &self.state, &mut self.context, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas.ui(ui, &self.state, &mut self.context, &mut self.pending_cmds);
        });

        // ── Process commands emitted by modules this frame ────────────────────
        let cmds: Vec<ViewerCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd, ctx);
        }

        if self.state.playing {
            let dt = ctx.input(|i| i.stable_dt as f64);
            self.state.tick_playback(dt);
            ctx.request_repaint();
        }

        // Runs last so a command that moved the playhead or switched source
        // requests its frame on the same pass. Dedup inside keeps this cheap.
        self.context.sync_view(&self.state);
    }
}
