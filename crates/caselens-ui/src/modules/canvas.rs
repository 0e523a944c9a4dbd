// crates/caselens-ui/src/modules/canvas.rs
//
// CanvasModule: the central panel. Letterboxes the current frame into the
// available rect, paints every overlay element on top, turns the pointer
// stream into native-space commands, and hosts the transport bar and the
// calibration distance prompt.
//
// All coordinate mapping goes through ViewportGeometry, rebuilt from the
// canvas rect on every pass. Pointer positions are mapped to native pixels
// HERE — app.rs and the tool engines never see screen coordinates.

use super::ViewerModule;
use caselens_core::commands::ViewerCommand;
use caselens_core::geometry::{pixel_length, NativePoint, ViewportGeometry};
use caselens_core::helpers::time::{format_duration, format_timecode};
use caselens_core::session::SessionState;
use caselens_core::tools::ActiveGesture;
use caselens_core::tools::ToolMode;
use crate::context::AppContext;
use crate::theme::{
    stroke_color, ACCENT, CALIBRATION, DARK_BG_2, DARK_BG_3, DARK_BORDER, DARK_TEXT,
    DARK_TEXT_DIM, ERROR_TEXT, MEASUREMENT, REGION_BOX,
};
use egui::{
    Align2, Color32, CornerRadius, FontId, Margin, Pos2, Rect, Response, RichText, Sense, Stroke,
    StrokeKind, Ui,
};

const TRANSPORT_H: f32 = 58.0;

pub struct CanvasModule {
    /// Distance typed into the calibration prompt. Cleared when the prompt
    /// closes, whichever way it closes.
    distance_input: String,
}

impl Default for CanvasModule {
    fn default() -> Self {
        Self { distance_input: String::new() }
    }
}

impl ViewerModule for CanvasModule {
    fn name(&self) -> &str { "Canvas" }

    fn ui(&mut self, ui: &mut Ui, state: &SessionState, ctx: &mut AppContext, cmd: &mut Vec<ViewerCommand>) {
        ui.vertical(|ui| {
            self.header(ui, state);

            let avail = ui.available_size();
            let canvas_h = (avail.y - TRANSPORT_H).max(60.0);
            let (outer_rect, _) =
                ui.allocate_exact_size(egui::vec2(avail.x, canvas_h), Sense::hover());

            let (nw, nh) = state.native_dims();
            let vp = ViewportGeometry::fit(
                outer_rect.left(),
                outer_rect.top(),
                outer_rect.width(),
                outer_rect.height(),
                nw,
                nh,
            );
            let video_rect = Rect::from_min_size(
                Pos2::new(vp.left, vp.top),
                egui::vec2(vp.width, vp.height),
            );

            let painter = ui.painter_at(outer_rect);
            painter.rect_filled(outer_rect, 0.0, Color32::BLACK);

            match (&ctx.view, state.active_source()) {
                // The texture can lag a source switch by a frame; never paint
                // one source's pixels under another's overlays.
                (Some(view), Some(source)) if view.source_id == source.id => {
                    painter.image(
                        view.texture.id(),
                        video_rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                (_, Some(source)) => {
                    let msg = if source.probe_error.is_some() { "UNREADABLE" } else { "DECODING…" };
                    idle_pattern(&painter, outer_rect, msg);
                }
                (_, None) => idle_pattern(&painter, outer_rect, "NO SOURCE"),
            }
            painter.rect_stroke(
                video_rect,
                0.0,
                Stroke::new(1.0, DARK_BORDER),
                StrokeKind::Outside,
            );

            paint_overlays(&painter, &vp, state);

            if let Some(source) = state.active_source() {
                name_tag(&painter, outer_rect, &source.name);
            }

            let response = ui.interact(
                outer_rect,
                egui::Id::new("viewer_canvas"),
                Sense::click_and_drag(),
            );
            if state.tools.mode() != ToolMode::View && response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
            }
            pointer_commands(&response, &vp, cmd);

            self.transport_bar(ui, state, cmd);
        });

        self.calibration_prompt(ui.ctx(), state, cmd);
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

impl CanvasModule {
    fn header(&self, ui: &mut Ui, state: &SessionState) {
        egui::Frame::new()
            .fill(DARK_BG_2)
            .inner_margin(Margin { left: 8, right: 8, top: 5, bottom: 5 })
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("🎞 Viewer").size(12.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let mode = state.tools.mode();
                        if mode != ToolMode::View {
                            ui.label(RichText::new(mode.label()).size(10.0).color(ACCENT));
                            ui.label(RichText::new("tool:").size(10.0).color(DARK_TEXT_DIM));
                        }
                        if let Some(info) = state.active_source().and_then(|s| s.info.as_ref()) {
                            ui.label(
                                RichText::new(format!("{}×{}", info.width, info.height))
                                    .size(10.0)
                                    .monospace()
                                    .color(DARK_TEXT_DIM),
                            );
                        }
                    });
                });
            });
    }

    fn transport_bar(&self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<ViewerCommand>) {
        let avail_w = ui.available_width();
        let (bar_rect, _) =
            ui.allocate_exact_size(egui::vec2(avail_w, TRANSPORT_H), Sense::hover());
        let inner = Rect::from_center_size(
            bar_rect.center(),
            egui::vec2(avail_w.min(760.0), TRANSPORT_H - 10.0),
        );
        let mut bar_ui = ui.new_child(egui::UiBuilder::new().max_rect(inner));

        egui::Frame::new()
            .fill(DARK_BG_3)
            .stroke(Stroke::new(1.0, DARK_BORDER))
            .corner_radius(CornerRadius::same(6))
            .inner_margin(Margin::same(8))
            .show(&mut bar_ui, |ui| {
                ui.horizontal(|ui| {
                    let ready = state
                        .active_source()
                        .map(|s| s.info.is_some())
                        .unwrap_or(false);

                    ui.add_enabled_ui(ready, |ui| {
                        if ui.button("⏮").on_hover_text("Back one frame").clicked() {
                            cmd.push(ViewerCommand::StepFrames(-1));
                        }
                        let play_label = if state.playing { "⏸" } else { "▶" };
                        if ui.button(play_label).clicked() {
                            cmd.push(ViewerCommand::TogglePlay);
                        }
                        if ui.button("⏭").on_hover_text("Forward one frame").clicked() {
                            cmd.push(ViewerCommand::StepFrames(1));
                        }
                    });

                    ui.label(
                        RichText::new(format_timecode(state.playhead))
                            .size(12.0)
                            .monospace()
                            .color(ACCENT),
                    );

                    let dur = state.duration();
                    let slider_w = (ui.available_width() - 96.0).max(60.0);
                    ui.spacing_mut().slider_width = slider_w;
                    let mut pos = state.playhead;
                    let slider = ui.add_enabled(
                        ready && dur > 0.0,
                        egui::Slider::new(&mut pos, 0.0..=dur.max(0.001))
                            .show_value(false)
                            .trailing_fill(true),
                    );
                    if slider.changed() {
                        cmd.push(ViewerCommand::SetPlayhead(pos));
                    }

                    ui.label(
                        RichText::new(format_duration(dur))
                            .size(10.0)
                            .monospace()
                            .color(DARK_TEXT_DIM),
                    );

                    if ui
                        .add_enabled(ready, egui::Button::new("📷"))
                        .on_hover_text("Save this frame as PNG")
                        .clicked()
                    {
                        cmd.push(ViewerCommand::SaveStillPicker);
                    }
                });
            });
    }

    fn calibration_prompt(
        &mut self,
        ctx: &egui::Context,
        state: &SessionState,
        cmd: &mut Vec<ViewerCommand>,
    ) {
        let Some(pending) = state.tools.pending_calibration() else {
            self.distance_input.clear();
            return;
        };

        egui::Window::new("Calibrate")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(format!("Reference line: {:.0} px", pending.pixel_len))
                        .size(11.0)
                        .color(DARK_TEXT_DIM),
                );
                ui.add_space(4.0);
                ui.label(RichText::new("Real-world length, meters").size(11.0));
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut self.distance_input)
                        .hint_text("e.g. 2.5")
                        .desired_width(150.0),
                );
                if self.distance_input.is_empty() && !edit.has_focus() {
                    edit.request_focus();
                }
                let submitted_by_enter =
                    edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let parse = caselens_core::tools::parse_distance_m(&self.distance_input);
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    // Any submission resolves the prompt: a bad value is
                    // discarded, the line dropped, and the tool stays armed.
                    if ui.button("Commit").clicked() || submitted_by_enter {
                        cmd.push(ViewerCommand::SubmitCalibrationDistance(
                            self.distance_input.clone(),
                        ));
                        self.distance_input.clear();
                    }
                    if ui.button("Cancel").clicked() {
                        cmd.push(ViewerCommand::CancelCalibration);
                        self.distance_input.clear();
                    }
                    if parse.is_err() && !self.distance_input.is_empty() {
                        ui.label(
                            RichText::new("positive meters only")
                                .size(10.0)
                                .color(ERROR_TEXT),
                        );
                    }
                });
            });
    }
}

// ── Painting ──────────────────────────────────────────────────────────────────

fn idle_pattern(painter: &egui::Painter, rect: Rect, message: &str) {
    let mut y = rect.top();
    while y < rect.bottom() {
        painter.hline(
            rect.left()..=rect.right(),
            y,
            Stroke::new(1.0, Color32::from_gray(18)),
        );
        y += 4.0;
    }
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        message,
        FontId::monospace(18.0),
        Color32::from_gray(70),
    );
}

fn name_tag(painter: &egui::Painter, rect: Rect, name: &str) {
    let pos = Pos2::new(rect.left() + 10.0, rect.bottom() - 22.0);
    let galley = painter.layout_no_wrap(name.to_owned(), FontId::proportional(11.0), DARK_TEXT);
    let bg = Rect::from_min_size(pos, galley.size() + egui::vec2(8.0, 4.0));
    painter.rect_filled(bg, 3.0, Color32::from_black_alpha(160));
    painter.galley(pos + egui::vec2(4.0, 2.0), galley, DARK_TEXT);
}

fn label_with_backing(painter: &egui::Painter, at: Pos2, text: String, color: Color32) {
    let galley = painter.layout_no_wrap(text, FontId::proportional(11.0), color);
    let bg = Rect::from_center_size(at, galley.size() + egui::vec2(8.0, 4.0));
    painter.rect_filled(bg, 3.0, Color32::from_black_alpha(160));
    painter.galley(bg.min + egui::vec2(4.0, 2.0), galley, color);
}

fn pointer_commands(response: &Response, vp: &ViewportGeometry, cmd: &mut Vec<ViewerCommand>) {
    let map = |pos: Pos2| {
        let p = vp.to_native(pos.x, pos.y);
        NativePoint::new(p.x.clamp(0.0, vp.native_w), p.y.clamp(0.0, vp.native_h))
    };

    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            // Gestures begin only on the footage itself, not the letterbox.
            if vp.contains(pos.x, pos.y) {
                cmd.push(ViewerCommand::PointerDown(map(pos)));
            }
        }
    } else if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            cmd.push(ViewerCommand::PointerMoved(map(pos)));
        }
    }
    if response.drag_stopped() {
        if let Some(pos) = response.interact_pointer_pos() {
            cmd.push(ViewerCommand::PointerUp(map(pos)));
        }
    }
    // A press-and-release without motion never fires the drag events, so
    // synthesize the pair; zero-movement gestures fall out in the tools.
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            if vp.contains(pos.x, pos.y) {
                let p = map(pos);
                cmd.push(ViewerCommand::PointerDown(p));
                cmd.push(ViewerCommand::PointerUp(p));
            }
        }
    }
}

fn paint_overlays(painter: &egui::Painter, vp: &ViewportGeometry, state: &SessionState) {
    let to_pos = |p: NativePoint| {
        let (x, y) = vp.to_screen(p);
        Pos2::new(x, y)
    };
    let midpoint = |a: Pos2, b: Pos2| Pos2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5 - 14.0);

    // Committed strokes.
    for s in &state.overlay.strokes {
        let pts: Vec<Pos2> = s.points.iter().map(|&p| to_pos(p)).collect();
        painter.add(egui::Shape::line(pts, Stroke::new(2.0, stroke_color(s.color))));
    }

    // Captured regions.
    for r in &state.overlay.regions {
        let rect = Rect::from_min_max(to_pos(r.rect.min), to_pos(r.rect.max));
        painter.rect_stroke(rect, 0.0, Stroke::new(1.5, REGION_BOX), StrokeKind::Outside);
    }

    // Measurements, labels at the midpoint.
    for m in &state.overlay.measurements {
        let a = to_pos(m.start);
        let b = to_pos(m.end);
        painter.line_segment([a, b], Stroke::new(2.0, MEASUREMENT));
        painter.circle_filled(a, 3.0, MEASUREMENT);
        painter.circle_filled(b, 3.0, MEASUREMENT);
        label_with_backing(painter, midpoint(a, b), m.label.clone(), MEASUREMENT);
    }

    // The calibration reference.
    if let Some(c) = &state.overlay.calibration {
        let a = to_pos(c.start);
        let b = to_pos(c.end);
        painter.line_segment([a, b], Stroke::new(2.0, CALIBRATION));
        painter.circle_filled(a, 3.0, CALIBRATION);
        painter.circle_filled(b, 3.0, CALIBRATION);
        label_with_backing(painter, midpoint(a, b), format!("{:.2} m", c.distance_m), CALIBRATION);
    }

    // A finished calibration drag waiting on its distance.
    if let Some(p) = state.tools.pending_calibration() {
        let a = to_pos(p.start);
        let b = to_pos(p.end);
        painter.line_segment([a, b], Stroke::new(2.0, CALIBRATION));
        painter.circle_filled(a, 3.0, CALIBRATION);
        painter.circle_filled(b, 3.0, CALIBRATION);
    }

    // The in-flight gesture.
    match state.tools.gesture() {
        ActiveGesture::Idle => {}
        ActiveGesture::Stroke { points } => {
            let pts: Vec<Pos2> = points.iter().map(|&p| to_pos(p)).collect();
            painter.add(egui::Shape::line(
                pts,
                Stroke::new(2.0, stroke_color(state.tools.stroke_color)),
            ));
        }
        ActiveGesture::Line { start, end } => {
            let color = match state.tools.mode() {
                ToolMode::Calibrate => CALIBRATION,
                _ => MEASUREMENT,
            };
            let a = to_pos(*start);
            let b = to_pos(*end);
            painter.line_segment([a, b], Stroke::new(2.0, color));
            // Live readout: px while calibrating, meters once a scale exists.
            let len_px = pixel_length(*start, *end);
            let label = match (state.tools.mode(), &state.overlay.calibration) {
                (ToolMode::Measure, Some(c)) => {
                    format!("{:.2} m", len_px as f64 / c.scale_factor)
                }
                _ => format!("{len_px:.0} px"),
            };
            label_with_backing(painter, midpoint(a, b), label, color);
        }
        ActiveGesture::Rect { anchor, corner } => {
            let rect = Rect::from_two_pos(to_pos(*anchor), to_pos(*corner));
            painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(80, 200, 120, 26));
            painter.rect_stroke(rect, 0.0, Stroke::new(1.5, REGION_BOX), StrokeKind::Outside);
        }
    }
}
