// crates/caselens-ui/src/modules/sources.rs
use super::ViewerModule;
use caselens_core::commands::ViewerCommand;
use caselens_core::helpers::time::format_duration;
use caselens_core::session::SessionState;
use crate::context::AppContext;
use crate::helpers::format::truncate;
use crate::theme::{ACCENT, DARK_BG_2, DARK_BG_3, DARK_BG_4, DARK_BORDER, DARK_TEXT_DIM, ERROR_TEXT};
use egui::{Align, Layout, RichText, Sense, Stroke, Ui};
use rfd::FileDialog;

pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "mkv", "avi", "webm", "m4v"];

pub struct SourcesModule;

impl ViewerModule for SourcesModule {
    fn name(&self) -> &str { "Sources" }

    fn ui(&mut self, ui: &mut Ui, state: &SessionState, _ctx: &mut AppContext, cmd: &mut Vec<ViewerCommand>) {
        ui.vertical(|ui| {
            // ── Header ──────────────────────────────────────────────────────
            egui::Frame::new()
                .fill(DARK_BG_2)
                .inner_margin(egui::Margin { left: 8, right: 8, top: 6, bottom: 6 })
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("🎥 Footage").size(12.0).strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.button(RichText::new("＋ Open").size(11.0)).clicked() {
                                if let Some(paths) = FileDialog::new()
                                    .add_filter("Video", &VIDEO_EXTENSIONS)
                                    .pick_files()
                                {
                                    for path in paths {
                                        cmd.push(ViewerCommand::AddSource(path));
                                    }
                                }
                            }
                        });
                    });
                });

            ui.separator();

            if !state.sources.is_empty() {
                ui.horizontal(|ui| {
                    ui.add_space(6.0);
                    ui.label(RichText::new(format!("{} sources", state.sources.len()))
                        .size(10.0).color(DARK_TEXT_DIM));
                });
            }

            // ── Source list ─────────────────────────────────────────────────
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(4.0);

                if state.sources.is_empty() {
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new("🎞").size(32.0));
                        ui.add_space(6.0);
                        ui.label(RichText::new("Drop footage here\nor use Open")
                            .size(11.0).color(DARK_TEXT_DIM));
                    });
                    return;
                }

                for source in &state.sources {
                    let id          = source.id;
                    let is_active   = state.active == Some(id);
                    let border      = if is_active { ACCENT } else { DARK_BORDER };
                    let fill        = if is_active { DARK_BG_4 } else { DARK_BG_3 };
                    let mut remove  = false;

                    let row = egui::Frame::new()
                        .fill(fill)
                        .stroke(Stroke::new(if is_active { 1.5 } else { 1.0 }, border))
                        .corner_radius(egui::CornerRadius::same(5))
                        .inner_margin(egui::Margin::same(6))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width() - 4.0);
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.label(RichText::new(truncate(&source.name, 28)).size(11.0));
                                    match (&source.info, &source.probe_error) {
                                        (Some(info), _) => {
                                            ui.label(RichText::new(format!(
                                                "{}×{} · {}",
                                                info.width,
                                                info.height,
                                                format_duration(info.duration_secs),
                                            )).size(9.0).color(DARK_TEXT_DIM).monospace());
                                        }
                                        (None, Some(err)) => {
                                            ui.label(RichText::new(truncate(err, 40))
                                                .size(9.0).color(ERROR_TEXT));
                                        }
                                        (None, None) => {
                                            ui.label(RichText::new("probing…")
                                                .size(9.0).color(DARK_TEXT_DIM));
                                        }
                                    }
                                });
                                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                    if ui.button(RichText::new("✕").size(10.0)).clicked() {
                                        remove = true;
                                    }
                                });
                            });
                        }).response;

                    let interact = ui.interact(row.rect, egui::Id::new("source_row").with(id), Sense::click());
                    if interact.clicked() && !remove {
                        cmd.push(ViewerCommand::SelectSource(id));
                    }
                    if remove {
                        cmd.push(ViewerCommand::RemoveSource(id));
                    }
                    ui.add_space(4.0);
                }
                ui.add_space(8.0);
            });
        });
    }
}
