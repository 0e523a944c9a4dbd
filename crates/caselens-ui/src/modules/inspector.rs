// crates/caselens-ui/src/modules/inspector.rs
//
// InspectorModule: right-panel UI for the annotation toolset.
//
//   Tool      — one button per mode; clicking the active tool drops back to
//               View (same as finishing a capture)
//   Stroke    — color tag applied to committed freehand strokes
//   Contrast  — display gain, re-baked live and applied to region crops
//   Calibrate — current px/m reference, or a hint when absent
//   Measure   — committed measurements, labels fixed at commit time
//   Regions   — captured crops with a free-text query per region; answers
//               land asynchronously and render under the thumb
//
// Reset Tools is destructive (strokes, calibration, measurements, regions
// all go at once) so it uses a two-stage confirm: first click arms a 5 s
// window, second click fires, expiry disarms.

use std::collections::HashMap;

use super::ViewerModule;
use caselens_core::commands::ViewerCommand;
use caselens_core::filter::{CONTRAST_MAX, CONTRAST_MIN, CONTRAST_NEUTRAL};
use caselens_core::helpers::time::format_timecode;
use caselens_core::session::SessionState;
use caselens_core::tools::ToolMode;
use crate::context::{region_uri, AppContext};
use crate::helpers::format::confidence_label;
use crate::theme::{
    stroke_color, ACCENT, CALIBRATION, DARK_BG_2, DARK_BG_3, DARK_BORDER, DARK_TEXT_DIM,
    MEASUREMENT,
};
use egui::{Color32, Margin, RichText, Stroke, Ui};
use uuid::Uuid;

pub struct InspectorModule {
    /// Draft query text per captured region.
    queries: HashMap<Uuid, String>,
    /// Two-stage reset confirm: `Some(t)` = armed, waiting for the second
    /// click within 5 s.
    reset_confirm_at: Option<std::time::Instant>,
}

impl Default for InspectorModule {
    fn default() -> Self {
        Self {
            queries: HashMap::new(),
            reset_confirm_at: None,
        }
    }
}

impl ViewerModule for InspectorModule {
    fn name(&self) -> &str { "Inspector" }

    fn ui(&mut self, ui: &mut Ui, state: &SessionState, ctx: &mut AppContext, cmd: &mut Vec<ViewerCommand>) {
        // Drop drafts for regions that no longer exist (reset, stale).
        self.queries
            .retain(|id, _| state.overlay.regions.iter().any(|r| r.id == *id));

        ui.vertical(|ui| {
            // ── Header ──────────────────────────────────────────────────────
            egui::Frame::new()
                .fill(DARK_BG_2)
                .inner_margin(Margin { left: 8, right: 8, top: 6, bottom: 6 })
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("🔍 Inspector").size(12.0).strong());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            self.reset_button(ui, state, cmd);
                        });
                    });
                });

            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .scroll_bar_visibility(egui::scroll_area::ScrollBarVisibility::VisibleWhenNeeded)
                .show(ui, |ui| {
                    ui.add_space(4.0);
                    self.tool_section(ui, state, cmd);
                    ui.add_space(10.0);
                    self.contrast_section(ui, state, cmd);
                    ui.add_space(10.0);
                    self.calibration_section(ui, state);
                    ui.add_space(10.0);
                    self.measurement_section(ui, state);
                    ui.add_space(10.0);
                    self.region_section(ui, state, ctx, cmd);
                    ui.add_space(8.0);
                });
        });
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

impl InspectorModule {
    fn reset_button(&mut self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<ViewerCommand>) {
        let can_reset = !state.overlay.is_empty();
        if !can_reset {
            self.reset_confirm_at = None;
        }
        // Auto-expire the confirmation window.
        if let Some(started) = self.reset_confirm_at {
            if started.elapsed().as_secs_f32() >= 5.0 {
                self.reset_confirm_at = None;
            }
        }
        let in_confirm = self.reset_confirm_at.is_some();

        let btn_label: String = if in_confirm {
            let secs_left = (5.0_f32
                - self.reset_confirm_at.unwrap().elapsed().as_secs_f32())
                .ceil() as u32;
            // Drive the countdown without relying on input events.
            ui.ctx()
                .request_repaint_after(std::time::Duration::from_millis(250));
            format!("⚠ {}s?", secs_left)
        } else {
            "🔄 Reset".into()
        };

        let (text_color, fill, border) = if in_confirm {
            (
                Color32::from_rgb(255, 160, 50),
                Color32::from_rgb(55, 38, 10),
                Color32::from_rgb(180, 110, 25),
            )
        } else {
            (DARK_TEXT_DIM, DARK_BG_3, DARK_BORDER)
        };

        let reset_btn = egui::Button::new(RichText::new(&btn_label).size(10.0).color(text_color))
            .fill(fill)
            .stroke(Stroke::new(1.0, border))
            .min_size(egui::vec2(62.0, 20.0));

        let hover_tip = if in_confirm {
            "Click again to clear all strokes, calibration, measurements, and regions"
        } else {
            "Clear every overlay element at once"
        };

        if ui
            .add_enabled(can_reset, reset_btn)
            .on_hover_text(hover_tip)
            .clicked()
        {
            if in_confirm {
                cmd.push(ViewerCommand::ResetTools);
                self.reset_confirm_at = None;
            } else {
                self.reset_confirm_at = Some(std::time::Instant::now());
            }
        }
    }

    fn tool_section(&self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<ViewerCommand>) {
        ui.label(RichText::new("Tool").size(11.0).color(DARK_TEXT_DIM));
        ui.add_space(2.0);
        ui.horizontal_wrapped(|ui| {
            for mode in ToolMode::ALL {
                let selected = state.tools.mode() == mode;
                let btn = egui::Button::new(
                    RichText::new(mode.label())
                        .size(11.0)
                        .color(if selected { ACCENT } else { DARK_TEXT_DIM }),
                )
                .stroke(Stroke::new(1.0, if selected { ACCENT } else { DARK_BORDER }))
                .fill(if selected { DARK_BG_3 } else { DARK_BG_2 });
                if ui.add(btn).clicked() {
                    cmd.push(ViewerCommand::SelectTool(mode));
                }
            }
        });

        ui.add_space(6.0);
        ui.label(RichText::new("Stroke").size(11.0).color(DARK_TEXT_DIM));
        ui.add_space(2.0);
        ui.horizontal(|ui| {
            for color in caselens_core::overlay::StrokeColor::ALL {
                let selected = state.tools.stroke_color == color;
                let fill = stroke_color(color);
                let btn = egui::Button::new("")
                    .fill(fill)
                    .stroke(Stroke::new(
                        if selected { 2.0 } else { 1.0 },
                        if selected { Color32::WHITE } else { DARK_BORDER },
                    ))
                    .min_size(egui::vec2(22.0, 18.0));
                if ui.add(btn).on_hover_text(color.label()).clicked() {
                    cmd.push(ViewerCommand::SetStrokeColor(color));
                }
            }
        });
    }

    fn contrast_section(&self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<ViewerCommand>) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Contrast").size(11.0).color(DARK_TEXT_DIM));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .button(RichText::new("1×").size(9.0))
                    .on_hover_text("Back to neutral")
                    .clicked()
                {
                    cmd.push(ViewerCommand::SetContrast(CONTRAST_NEUTRAL));
                }
                ui.label(
                    RichText::new(format!("{:.2}×", state.contrast))
                        .size(10.0)
                        .monospace()
                        .color(DARK_TEXT_DIM),
                );
            });
        });
        ui.add_space(2.0);
        let mut gain = state.contrast;
        let slider = ui.add(
            egui::Slider::new(&mut gain, CONTRAST_MIN..=CONTRAST_MAX)
                .show_value(false)
                .trailing_fill(true),
        );
        if slider.changed() {
            cmd.push(ViewerCommand::SetContrast(gain));
        }
    }

    fn calibration_section(&self, ui: &mut Ui, state: &SessionState) {
        ui.label(RichText::new("Calibration").size(11.0).color(DARK_TEXT_DIM));
        ui.add_space(2.0);
        egui::Frame::new()
            .fill(DARK_BG_3)
            .stroke(Stroke::new(1.0, DARK_BORDER))
            .corner_radius(egui::CornerRadius::same(4))
            .inner_margin(Margin::same(8))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                match &state.overlay.calibration {
                    Some(c) => {
                        ui.label(
                            RichText::new(format!("Scale: {:.1} px/m", c.scale_factor))
                                .size(11.0)
                                .monospace()
                                .color(CALIBRATION),
                        )
                        .on_hover_text(
                            "Existing measurements keep the scale they were taken with",
                        );
                        ui.label(
                            RichText::new(format!(
                                "Ref:   {:.2} m over {:.0} px",
                                c.distance_m, c.pixel_len,
                            ))
                            .size(11.0)
                            .monospace(),
                        );
                        ui.add_space(2.0);
                        ui.label(
                            RichText::new("Draw a new line in Calibrate to replace")
                                .size(10.0)
                                .color(DARK_TEXT_DIM),
                        );
                    }
                    None => {
                        ui.label(
                            RichText::new("Uncalibrated")
                                .size(11.0)
                                .color(DARK_TEXT_DIM),
                        );
                        ui.label(
                            RichText::new("Draw a known distance with the Calibrate tool")
                                .size(10.0)
                                .color(DARK_TEXT_DIM),
                        );
                        if state.tools.mode() == ToolMode::Measure {
                            ui.add_space(2.0);
                            ui.label(
                                RichText::new("Measure stays inert until calibrated")
                                    .size(10.0)
                                    .color(MEASUREMENT),
                            );
                        }
                    }
                }
            });
    }

    fn measurement_section(&self, ui: &mut Ui, state: &SessionState) {
        ui.label(
            RichText::new(format!("Measurements ({})", state.overlay.measurements.len()))
                .size(11.0)
                .color(DARK_TEXT_DIM),
        );
        ui.add_space(2.0);
        if state.overlay.measurements.is_empty() {
            ui.label(RichText::new("none yet").size(10.0).color(DARK_TEXT_DIM));
            return;
        }
        for m in &state.overlay.measurements {
            ui.label(
                RichText::new(format!("📏 {}  ({:.0} px)", m.label, m.pixel_len))
                    .size(11.0)
                    .monospace()
                    .color(MEASUREMENT),
            );
        }
    }

    fn region_section(
        &mut self,
        ui: &mut Ui,
        state: &SessionState,
        ctx: &mut AppContext,
        cmd: &mut Vec<ViewerCommand>,
    ) {
        let pending_captures = ctx.pending_regions.len();
        ui.label(
            RichText::new(format!("Regions ({})", state.overlay.regions.len()))
                .size(11.0)
                .color(DARK_TEXT_DIM),
        );
        ui.add_space(2.0);

        if pending_captures > 0 {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(
                    RichText::new(format!("capturing {pending_captures}…"))
                        .size(10.0)
                        .color(DARK_TEXT_DIM),
                );
            });
        }
        if state.overlay.regions.is_empty() && pending_captures == 0 {
            ui.label(
                RichText::new("Drag a box with the Scan tool to capture")
                    .size(10.0)
                    .color(DARK_TEXT_DIM),
            );
            return;
        }

        for region in &state.overlay.regions {
            let id = region.id;
            egui::Frame::new()
                .fill(DARK_BG_3)
                .stroke(Stroke::new(1.0, DARK_BORDER))
                .corner_radius(egui::CornerRadius::same(4))
                .inner_margin(Margin::same(6))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::Image::from_uri(region_uri(id))
                                .fit_to_exact_size(egui::vec2(96.0, 60.0))
                                .corner_radius(egui::CornerRadius::same(3)),
                        );
                        ui.vertical(|ui| {
                            ui.label(
                                RichText::new(format!("at {}", format_timecode(region.taken_at)))
                                    .size(10.0)
                                    .monospace()
                                    .color(DARK_TEXT_DIM),
                            );
                            ui.label(
                                RichText::new(format!(
                                    "{}×{} px",
                                    region.rect.width().round() as u32,
                                    region.rect.height().round() as u32,
                                ))
                                .size(10.0)
                                .monospace()
                                .color(DARK_TEXT_DIM),
                            );
                            if ui
                                .button(RichText::new("💾 Save").size(10.0))
                                .clicked()
                            {
                                cmd.push(ViewerCommand::SaveRegionPicker(id));
                            }
                        });
                    });

                    ui.add_space(4.0);
                    let draft = self.queries.entry(id).or_default();
                    let asking = ctx.pending_answers.contains(&id);
                    ui.add_enabled(
                        !asking,
                        egui::TextEdit::singleline(draft)
                            .desired_width(f32::INFINITY)
                            .hint_text("Ask about this region…"),
                    );
                    ui.horizontal(|ui| {
                        let can_ask = !draft.trim().is_empty() && !asking;
                        if ui
                            .add_enabled(can_ask, egui::Button::new(RichText::new("Ask").size(10.0)))
                            .clicked()
                        {
                            cmd.push(ViewerCommand::SubmitRegionQuery {
                                region: id,
                                query: draft.trim().to_string(),
                            });
                        }
                        if asking {
                            ui.spinner();
                            ui.label(RichText::new("waiting…").size(10.0).color(DARK_TEXT_DIM));
                        }
                    });

                    if let Some(answer) = &region.answer {
                        ui.add_space(4.0);
                        ui.label(RichText::new(&answer.answer).size(11.0));
                        ui.label(
                            RichText::new(format!(
                                "confidence {}",
                                confidence_label(answer.confidence),
                            ))
                            .size(9.0)
                            .color(DARK_TEXT_DIM),
                        );
                    }
                });
            ui.add_space(4.0);
        }
    }
}
