// crates/caselens-ui/src/modules/evidence.rs
//
// EvidenceModule: bottom-panel UI for the frame + audio ingest pipeline and
// the collaborator report.
//
// State machine (driven by SessionState ingest fields, set by AppContext):
//
//   Idle    → user clicks "Ingest"
//             → app.rs mints a generation, calls media_worker.start_ingest
//
//   Running → IngestProgress results arrive per sampled frame
//             → progress bar + frame counter; controls disabled
//
//   Failed  → error shown in red; the Ingest button doubles as Retry
//
//   Ready   → stills strip + audio summary; "Submit Evidence" becomes
//             available and posts the bundle to the collaborator
//
// The report text lands later via the collab channel and renders verbatim
// in the right-hand column.

use super::ViewerModule;
use caselens_core::commands::ViewerCommand;
use caselens_core::helpers::time::format_timecode;
use caselens_core::session::{IngestStatus, SessionState, MAX_FRAME_COUNT, MIN_FRAME_COUNT};
use crate::context::{evidence_uri, AppContext};
use crate::helpers::format::truncate;
use crate::theme::{ACCENT, DARK_BG_2, DARK_BG_3, DARK_BORDER, DARK_TEXT_DIM};
use egui::{Color32, Margin, RichText, Stroke, Ui};

/// Muted green for the "bundle ready" summary.
const GREEN_DIM: Color32 = Color32::from_rgb(80, 190, 120);
/// Muted red for ingest failures.
const RED_DIM: Color32 = Color32::from_rgb(200, 80, 80);

const CONTROLS_W: f32 = 180.0;
const REPORT_W: f32 = 320.0;
const THUMB_H: f32 = 86.0;

pub struct EvidenceModule;

impl ViewerModule for EvidenceModule {
    fn name(&self) -> &str { "Evidence" }

    fn ui(&mut self, ui: &mut Ui, state: &SessionState, ctx: &mut AppContext, cmd: &mut Vec<ViewerCommand>) {
        let Some(source) = state.active_source() else {
            ui.add_space(30.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Open a source to build evidence")
                    .size(11.0).color(DARK_TEXT_DIM));
            });
            return;
        };
        let id      = source.id;
        let name    = source.name.clone();
        let probed  = source.info.is_some();
        let status  = state.ingest_status(id);
        let running = matches!(status, IngestStatus::Running { .. });

        ui.vertical(|ui| {
            // ── Header ──────────────────────────────────────────────────────
            egui::Frame::new()
                .fill(DARK_BG_2)
                .inner_margin(Margin { left: 8, right: 8, top: 6, bottom: 6 })
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("🧾 Evidence").size(12.0).strong());
                        ui.label(RichText::new(truncate(&name, 36)).size(10.0).color(DARK_TEXT_DIM));
                    });
                });

            ui.separator();

            ui.horizontal_top(|ui| {
                // ── Controls column ─────────────────────────────────────────
                ui.allocate_ui(egui::vec2(CONTROLS_W, ui.available_height()), |ui| {
                    ui.vertical(|ui| {
                        ui.add_space(4.0);
                        ui.label(RichText::new("Stills per run").size(11.0).color(DARK_TEXT_DIM));
                        let mut count = state.frame_count;
                        let slider = ui.add_enabled(
                            !running,
                            egui::Slider::new(&mut count, MIN_FRAME_COUNT..=MAX_FRAME_COUNT)
                                .trailing_fill(true),
                        );
                        if slider.changed() {
                            cmd.push(ViewerCommand::SetFrameCount(count));
                        }

                        ui.add_space(8.0);

                        let ingest_label = if state.evidence.contains_key(&id) {
                            "⟳ Re-ingest"
                        } else {
                            "⚙ Ingest"
                        };
                        let ingest_btn = egui::Button::new(
                            RichText::new(ingest_label).size(11.0),
                        )
                        .min_size(egui::vec2(CONTROLS_W - 10.0, 24.0));
                        let resp = ui.add_enabled(probed && !running, ingest_btn);
                        if resp.clicked() {
                            cmd.push(ViewerCommand::BeginIngest(id));
                        }
                        if !probed {
                            resp.on_hover_text("Waiting for the probe to finish");
                        }

                        ui.add_space(6.0);

                        match &status {
                            IngestStatus::Running { done, total, .. } => {
                                let frac = *done as f32 / (*total).max(1) as f32;
                                ui.add(
                                    egui::ProgressBar::new(frac)
                                        .desired_width(CONTROLS_W - 10.0)
                                        .fill(ACCENT),
                                );
                                ui.label(RichText::new(format!("frame {done} / {total}"))
                                    .size(10.0).color(DARK_TEXT_DIM).monospace());
                            }
                            IngestStatus::Failed(err) => {
                                ui.label(RichText::new(truncate(err, 60))
                                    .size(10.0).color(RED_DIM));
                            }
                            IngestStatus::Ready => {
                                if let Some(bundle) = state.evidence.get(&id) {
                                    let audio = match &bundle.audio {
                                        Some(clip) => format!(
                                            "{} kHz · {} ch audio",
                                            clip.sample_rate / 1000,
                                            clip.channel_count,
                                        ),
                                        None => "no audio track".into(),
                                    };
                                    ui.label(RichText::new(format!(
                                        "✓ {} stills · {audio}",
                                        bundle.frames.len(),
                                    )).size(10.0).color(GREEN_DIM));
                                }
                            }
                            IngestStatus::Idle => {}
                        }

                        ui.add_space(8.0);

                        let submitting = ctx.pending_reports.contains_key(&id);
                        let can_submit =
                            status == IngestStatus::Ready && !submitting && !running;
                        let submit_label = if submitting { "Submitting…" } else { "📡 Submit Evidence" };
                        let submit_btn = egui::Button::new(
                            RichText::new(submit_label)
                                .size(11.0)
                                .strong()
                                .color(if can_submit { Color32::BLACK } else { DARK_TEXT_DIM }),
                        )
                        .fill(if can_submit { ACCENT } else { DARK_BG_3 })
                        .stroke(Stroke::NONE)
                        .min_size(egui::vec2(CONTROLS_W - 10.0, 28.0));
                        if ui.add_enabled(can_submit, submit_btn).clicked() {
                            cmd.push(ViewerCommand::SubmitEvidence(id));
                        }
                    });
                });

                ui.separator();

                // ── Stills strip ────────────────────────────────────────────
                let strip_w = (ui.available_width() - REPORT_W - 16.0).max(120.0);
                ui.allocate_ui(egui::vec2(strip_w, ui.available_height()), |ui| {
                    if let Some(bundle) = state.evidence.get(&id) {
                        let rev = ctx.bundle_rev(id);
                        egui::ScrollArea::horizontal()
                            .id_salt("evidence_strip")
                            .show(ui, |ui| {
                                ui.horizontal(|ui| {
                                    ui.spacing_mut().item_spacing = egui::vec2(6.0, 4.0);
                                    for (i, frame) in bundle.frames.iter().enumerate() {
                                        ui.vertical(|ui| {
                                            ui.add(
                                                egui::Image::from_uri(evidence_uri(id, rev, i))
                                                    .fit_to_exact_size(egui::vec2(
                                                        THUMB_H * 16.0 / 9.0,
                                                        THUMB_H,
                                                    ))
                                                    .corner_radius(egui::CornerRadius::same(3)),
                                            );
                                            ui.label(
                                                RichText::new(format_timecode(frame.timestamp_secs))
                                                    .size(9.0)
                                                    .monospace()
                                                    .color(DARK_TEXT_DIM),
                                            );
                                        });
                                    }
                                });
                            });
                    } else {
                        ui.add_space(30.0);
                        ui.vertical_centered(|ui| {
                            let hint = match &status {
                                IngestStatus::Running { .. } => "Sampling stills…",
                                IngestStatus::Failed(_)      => "Ingest failed — retry when ready",
                                _ => "Ingest to sample stills across the footage",
                            };
                            ui.label(RichText::new(hint).size(11.0).color(DARK_TEXT_DIM));
                        });
                    }
                });

                ui.separator();

                // ── Report column ───────────────────────────────────────────
                ui.vertical(|ui| {
                    ui.add_space(4.0);
                    ui.label(RichText::new("Collaborator Report").size(11.0).color(DARK_TEXT_DIM));
                    ui.add_space(2.0);
                    if ctx.pending_reports.contains_key(&id) {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(RichText::new("Analyzing…").size(11.0).color(DARK_TEXT_DIM));
                        });
                    } else if let Some(text) = state.reports.get(&id) {
                        egui::ScrollArea::vertical()
                            .id_salt("report_text")
                            .auto_shrink([false, false])
                            .show(ui, |ui| {
                                ui.set_width(REPORT_W - 12.0);
                                ui.label(RichText::new(text).size(11.0));
                            });
                    } else {
                        ui.label(RichText::new("Submit evidence to request a report")
                            .size(10.0).color(DARK_TEXT_DIM));
                    }
                });
            });
        });
    }
}
