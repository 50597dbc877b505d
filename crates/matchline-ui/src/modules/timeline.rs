// crates/matchline-ui/src/modules/timeline.rs
//
// The timeline panel: ruler, guide lines, clips with selection and marker
// overlays, the draggable playhead and the cut line. All pointer input is
// routed to TimelineCommands; the panel never mutates state.

use egui::{
    Align2, Color32, FontId, Id, Pos2, Rect, Sense, Shape, Stroke, TextureHandle, Ui,
};

use matchline_core::autoscroll::{AutoScroll, ScrollAnimation, Viewport};
use matchline_core::commands::TimelineCommand;
use matchline_core::helpers::time::{format_time, format_time_long};
use matchline_core::timeline::TimelineState;

use super::Panel;
use crate::theme::{
    ACCENT, CLIP_ACTIVE, CLIP_BODY, CUT_LINE, DARK_BG_0, DARK_BG_2, DARK_TEXT_DIM,
    GUIDE_LINE, RULER_BG, SELECTION, SELECTION_EDGE,
};

const HEADER_H: f32 = 28.0;
const TRACK_H:  f32 = 80.0;
const HANDLE_W: f32 = 5.0;

pub struct TimelinePanel {
    /// Last timeline position (seconds) for which a scrub seek was emitted.
    /// Dedupes DragPlayheadTo / ruler seeks during drags: at low zoom many
    /// pixels of mouse movement map to sub-frame time deltas, and emitting
    /// them all floods the decode thread with redundant seeks.
    last_scrub_emitted_time: f64,

    /// Viewport over the scene as of the previous frame, scene pixels.
    viewport: Viewport,
    content_width: f32,

    scroll_anim:    Option<ScrollAnimation>,
    pending_offset: Option<f32>,
}

impl TimelinePanel {
    pub fn new() -> Self {
        Self {
            last_scrub_emitted_time: f64::NEG_INFINITY,
            viewport: Viewport { left: 0.0, width: 0.0 },
            content_width: 0.0,
            scroll_anim: None,
            pending_offset: None,
        }
    }

    /// Emit a scrub seek only when the drag moved at least one frame's worth
    /// of time since the last emission.
    fn emit_scrub(&mut self, t: f64, force: bool, cmd: &mut Vec<TimelineCommand>, px: f32) {
        if force || (t - self.last_scrub_emitted_time).abs() >= 1.0 / 30.0 {
            cmd.push(TimelineCommand::DragPlayheadTo(px));
            self.last_scrub_emitted_time = t;
        }
    }

    fn keyboard_shortcuts(
        &mut self,
        ui:    &Ui,
        state: &TimelineState,
        cmd:   &mut Vec<TimelineCommand>,
    ) {
        ui.input(|i| {
            if i.key_pressed(egui::Key::Space) {
                cmd.push(if state.is_playing {
                    TimelineCommand::Pause
                } else {
                    TimelineCommand::Play
                });
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                cmd.push(TimelineCommand::NudgeFrame(-1));
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                cmd.push(TimelineCommand::NudgeFrame(1));
            }
            // S — split the clip under the playhead.
            if i.key_pressed(egui::Key::S) {
                if let Some((clip_id, local_x)) =
                    state.clip_at_scene_x(state.playhead.position_px())
                {
                    cmd.push(TimelineCommand::SplitAt { clip_id, local_x });
                }
            }
        });
    }

    fn toolbar(&mut self, ui: &mut Ui, state: &TimelineState, cmd: &mut Vec<TimelineCommand>) {
        egui::Frame::new()
            .fill(DARK_BG_2)
            .inner_margin(egui::Margin::same(6))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    // ── Cut mode ──────────────────────────────────────────
                    let cut = ui
                        .selectable_label(state.cut_mode, "✂ Cut")
                        .on_hover_text("Click a clip to split it  [S splits at playhead]");
                    if cut.clicked() {
                        cmd.push(TimelineCommand::SetCutMode(!state.cut_mode));
                    }

                    ui.separator();

                    // ── Zoom ──────────────────────────────────────────────
                    if ui.button("🔍-").clicked() {
                        cmd.push(TimelineCommand::ZoomOut);
                    }
                    let mut level = state.scale.zoom_level() as u32;
                    if ui
                        .add(egui::Slider::new(&mut level, 0..=100).show_value(false))
                        .changed()
                    {
                        cmd.push(TimelineCommand::SetZoom(level as u8));
                    }
                    if ui.button("🔍+").clicked() {
                        cmd.push(TimelineCommand::ZoomIn);
                    }
                    if ui.button("Fit").clicked() {
                        cmd.push(TimelineCommand::ZoomFit);
                    }
                    ui.label(
                        egui::RichText::new(format!(
                            "{:.0} px/s",
                            state.scale.pixels_per_second()
                        ))
                        .size(10.0)
                        .color(DARK_TEXT_DIM),
                    );

                    // ── Right side: status / hint ─────────────────────────
                    ui.with_layout(
                        egui::Layout::right_to_left(egui::Align::Center),
                        |ui| {
                            if let Some(status) = &state.status {
                                ui.label(
                                    egui::RichText::new(status)
                                        .size(10.0)
                                        .color(Color32::from_rgb(120, 220, 120)),
                                );
                            } else {
                                ui.label(
                                    egui::RichText::new(
                                        "Space=Play  ⬅➡=Frame  S=Split  Shift+Drag=Select",
                                    )
                                    .size(9.0)
                                    .color(Color32::from_gray(90)),
                                );
                            }
                        },
                    );
                });
            });

        // Auto-clear status after 3 seconds (pure UI memory, no state
        // mutation).
        if state.status.is_some() {
            let t = ui.input(|i| i.time);
            ui.memory_mut(|mem| {
                let key = Id::new("status_time");
                let start = mem.data.get_temp_mut_or_insert_with(key, || t);
                if t - *start > 3.0 {
                    cmd.push(TimelineCommand::ClearStatus);
                    mem.data.remove::<f64>(key);
                }
            });
            ui.ctx().request_repaint();
        } else {
            ui.memory_mut(|mem| mem.data.remove::<f64>(Id::new("status_time")));
        }
    }

    fn draw_ruler(&self, painter: &egui::Painter, rect: Rect, state: &TimelineState) {
        painter.rect_filled(
            Rect::from_min_size(rect.min, egui::vec2(rect.width(), HEADER_H)),
            0.0,
            RULER_BG,
        );
        let pps = state.scale.pixels_per_second();
        let (major, minor) = state.scale.ruler_intervals();
        let max_secs = (rect.width() / pps).ceil() as u32;

        let mut s = 0u32;
        while s <= max_secs {
            let x = rect.min.x + s as f32 * pps;
            let is_major = s % major == 0;
            let tick_h = if is_major { 10.0 } else { 5.0 };
            painter.line_segment(
                [
                    Pos2::new(x, rect.min.y + HEADER_H - tick_h),
                    Pos2::new(x, rect.min.y + HEADER_H),
                ],
                Stroke::new(
                    if is_major { 2.0 } else { 1.0 },
                    if is_major { Color32::WHITE } else { Color32::GRAY },
                ),
            );
            if is_major {
                painter.text(
                    Pos2::new(x + 3.0, rect.min.y + 3.0),
                    Align2::LEFT_TOP,
                    format_time_long(s as f64 * 1000.0),
                    FontId::monospace(9.0),
                    Color32::from_gray(160),
                );
            }
            s += minor;
        }
    }

    fn draw_guide_lines(&self, painter: &egui::Painter, rect: Rect, state: &TimelineState) {
        let pps = state.scale.pixels_per_second();
        let interval = state.scale.guide_interval();
        let max_secs = state.scale.timeline_duration() as u32;
        let stroke = Stroke::new(1.0, GUIDE_LINE);

        let mut s = 0u32;
        while s <= max_secs {
            let x = rect.min.x + s as f32 * pps;
            if x <= rect.max.x {
                painter.extend(Shape::dashed_line(
                    &[
                        Pos2::new(x, rect.min.y + HEADER_H),
                        Pos2::new(x, rect.min.y + HEADER_H + TRACK_H),
                    ],
                    stroke,
                    4.0,
                    4.0,
                ));
            }
            s += interval;
        }
    }

    /// Apply auto-scroll for this frame, after the scroll area reported its
    /// viewport. Skipped while the user drags the playhead — the pointer is
    /// already where they want to look.
    fn auto_scroll(&mut self, ui: &Ui, state: &TimelineState) {
        let dt = ui.input(|i| i.stable_dt);

        if let Some(anim) = &mut self.scroll_anim {
            self.pending_offset = Some(anim.advance(dt));
            if anim.finished() {
                self.scroll_anim = None;
            }
            ui.ctx().request_repaint();
            return;
        }

        if state.playhead.is_dragging() || self.viewport.width <= 0.0 {
            return;
        }
        let policy = AutoScroll::policy(state.is_playing, state.keyboard_nav);
        let Some(center) =
            state
                .autoscroll
                .target_center(policy, state.playhead.position_px(), self.viewport)
        else {
            return;
        };
        let max_offset = (self.content_width - self.viewport.width).max(0.0);
        let target = (center - self.viewport.width / 2.0).clamp(0.0, max_offset);
        if state.autoscroll.smooth {
            self.scroll_anim = Some(ScrollAnimation::new(self.viewport.left, target));
        } else {
            self.pending_offset = Some(target);
        }
        ui.ctx().request_repaint();
    }
}

impl Panel for TimelinePanel {
    fn name(&self) -> &str {
        "Timeline"
    }

    fn ui(
        &mut self,
        ui:     &mut Ui,
        state:  &TimelineState,
        _frame: Option<&TextureHandle>,
        cmd:    &mut Vec<TimelineCommand>,
    ) {
        self.keyboard_shortcuts(ui, state, cmd);

        ui.vertical(|ui| {
            self.toolbar(ui, state, cmd);
            ui.separator();

            let mut scroll = egui::ScrollArea::horizontal().id_salt("timeline_scroll");
            if let Some(offset) = self.pending_offset.take() {
                scroll = scroll.horizontal_scroll_offset(offset);
            }

            let output = scroll.show(ui, |ui| {
                let total_w = state.timeline_width() + 300.0;
                let total_h = HEADER_H + TRACK_H + 8.0;

                let (rect, response) =
                    ui.allocate_exact_size(egui::vec2(total_w, total_h), Sense::click());
                // Owned Painter (Arc-backed) so `ui` stays free for interact
                // calls below.
                let painter = ui.painter().clone();

                painter.rect_filled(rect, 0.0, DARK_BG_0);
                self.draw_ruler(&painter, rect, state);
                self.draw_guide_lines(&painter, rect, state);

                // ── Ruler click/drag → seek ───────────────────────────────
                let ruler_rect =
                    Rect::from_min_size(rect.min, egui::vec2(rect.width(), HEADER_H));
                let ruler_resp =
                    ui.interact(ruler_rect, Id::new("timeline_ruler"), Sense::click_and_drag());
                if ruler_resp.clicked() || ruler_resp.dragged() {
                    if let Some(ptr) = ruler_resp.interact_pointer_pos() {
                        let x = (ptr.x - rect.min.x).max(0.0);
                        let t = state.scale.px_to_time(x);
                        if ruler_resp.clicked() || ruler_resp.drag_started() {
                            cmd.push(TimelineCommand::Seek(t));
                            self.last_scrub_emitted_time = t;
                        } else if (t - self.last_scrub_emitted_time).abs() >= 1.0 / 30.0 {
                            cmd.push(TimelineCommand::Seek(t));
                            self.last_scrub_emitted_time = t;
                        }
                    }
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                }

                // ── Clips ─────────────────────────────────────────────────
                for clip in &state.clips {
                    let clip_rect = Rect::from_min_size(
                        Pos2::new(rect.min.x + clip.position_px, rect.min.y + HEADER_H),
                        egui::vec2(clip.width_px().max(2.0), TRACK_H),
                    );

                    let body = if clip.is_active { CLIP_ACTIVE } else { CLIP_BODY };
                    painter.rect_filled(clip_rect, 3.0, body);
                    painter.rect_stroke(
                        clip_rect,
                        3.0,
                        Stroke::new(if clip.is_active { 2.0 } else { 1.0 }, Color32::BLACK),
                        egui::StrokeKind::Inside,
                    );

                    // Trim handles at each edge, tracking the clip's width.
                    painter.rect_filled(
                        Rect::from_min_size(clip_rect.min, egui::vec2(HANDLE_W, TRACK_H)),
                        0.0,
                        Color32::from_rgb(230, 200, 60),
                    );
                    painter.rect_filled(
                        Rect::from_min_size(
                            Pos2::new(
                                clip_rect.min.x + clip.handle_px() - HANDLE_W,
                                clip_rect.min.y,
                            ),
                            egui::vec2(HANDLE_W, TRACK_H),
                        ),
                        0.0,
                        Color32::from_rgb(200, 70, 70),
                    );

                    // ── Markers ───────────────────────────────────────────
                    for marker in state.markers.iter().filter(|m| m.clip_id == clip.id) {
                        let style = state.catalogue.style(&marker.event_type);
                        let [r, g, b] = style.color;
                        let x0 = clip_rect.min.x + clip.local_px(marker.start_ms);
                        let x1 = clip_rect.min.x + clip.local_px(marker.end_ms);
                        let marker_rect = Rect::from_min_max(
                            Pos2::new(x0, clip_rect.min.y),
                            Pos2::new(x1.max(x0 + 2.0), clip_rect.max.y),
                        );
                        painter.rect_filled(
                            marker_rect,
                            0.0,
                            Color32::from_rgba_unmultiplied(r, g, b, 70),
                        );
                        painter.rect_filled(
                            Rect::from_min_size(
                                marker_rect.min,
                                egui::vec2(marker_rect.width(), 3.0),
                            ),
                            0.0,
                            Color32::from_rgb(r, g, b),
                        );
                        if marker_rect.width() > 16.0 {
                            painter.text(
                                Pos2::new(marker_rect.min.x + 2.0, marker_rect.min.y + 5.0),
                                Align2::LEFT_TOP,
                                &style.icon,
                                FontId::proportional(10.0),
                                Color32::WHITE,
                            );
                        }
                        ui.interact(marker_rect, Id::new(("marker", marker.id)), Sense::hover())
                            .on_hover_text(format!(
                                "{} — {} – {}",
                                marker.label,
                                format_time(marker.start_ms),
                                format_time(marker.end_ms),
                            ));
                    }

                    // ── Selection overlays ────────────────────────────────
                    let draw_range = |x0: f32, x1: f32, committed: bool| {
                        let sel_rect = Rect::from_min_max(
                            Pos2::new(clip_rect.min.x + x0, clip_rect.min.y),
                            Pos2::new(clip_rect.min.x + x1, clip_rect.max.y),
                        );
                        painter.rect_filled(sel_rect, 0.0, SELECTION);
                        let stroke = Stroke::new(if committed { 2.0 } else { 1.0 }, SELECTION_EDGE);
                        painter.extend(Shape::dashed_line(
                            &[sel_rect.left_top(), sel_rect.left_bottom()],
                            stroke, 4.0, 3.0,
                        ));
                        painter.extend(Shape::dashed_line(
                            &[sel_rect.right_top(), sel_rect.right_bottom()],
                            stroke, 4.0, 3.0,
                        ));
                        sel_rect
                    };
                    if let Some(sel) = clip.selection {
                        let r = draw_range(
                            clip.local_px(sel.start_ms),
                            clip.local_px(sel.end_ms),
                            true,
                        );
                        if r.width() > 40.0 {
                            painter.text(
                                r.min + egui::vec2(4.0, 4.0),
                                Align2::LEFT_TOP,
                                format!(
                                    "{} – {}",
                                    format_time(sel.start_ms),
                                    format_time(sel.end_ms)
                                ),
                                FontId::proportional(9.0),
                                Color32::BLACK,
                            );
                        }
                    }
                    if let Some((x0, x1)) = clip.drag_extent() {
                        draw_range(x0, x1, false);
                    }

                    // ── Labels ────────────────────────────────────────────
                    if clip_rect.width() > 30.0 {
                        painter.text(
                            clip_rect.min + egui::vec2(8.0, 8.0),
                            Align2::LEFT_TOP,
                            fit_label(&clip.source_name, clip_rect.width() * 0.6),
                            FontId::proportional(11.0),
                            Color32::WHITE,
                        );
                        let mut badge = format_time(clip.actual_duration_ms());
                        if clip.is_trimmed() {
                            badge += &format!(
                                " [{}-{}]",
                                format_time(clip.start_trim),
                                format_time(clip.end_trim)
                            );
                        }
                        painter.text(
                            Pos2::new(clip_rect.min.x + 8.0, clip_rect.max.y - 6.0),
                            Align2::LEFT_BOTTOM,
                            badge,
                            FontId::monospace(8.0),
                            Color32::YELLOW,
                        );
                    }

                    // ── Pointer routing ───────────────────────────────────
                    let resp = ui.interact(
                        clip_rect,
                        Id::new(clip.id),
                        Sense::click_and_drag(),
                    );
                    let shift = ui.input(|i| i.modifiers.shift);
                    let local =
                        |p: Pos2| (p.x - clip_rect.min.x).clamp(0.0, clip_rect.width());

                    if state.cut_mode {
                        if resp.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::VerticalText);
                        }
                        if resp.clicked() {
                            if let Some(ptr) = resp.interact_pointer_pos() {
                                cmd.push(TimelineCommand::SplitAt {
                                    clip_id: clip.id,
                                    local_x: local(ptr),
                                });
                            }
                        }
                    } else if clip.selection_in_progress() {
                        // Continue the selection even if Shift was released
                        // mid-drag.
                        if let Some(ptr) = resp.interact_pointer_pos() {
                            cmd.push(TimelineCommand::UpdateSelection {
                                clip_id: clip.id,
                                local_x: local(ptr),
                            });
                        }
                        if resp.drag_stopped() {
                            cmd.push(TimelineCommand::EndSelection { clip_id: clip.id });
                        }
                        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
                    } else if shift && resp.drag_started() {
                        if let Some(ptr) = resp.interact_pointer_pos() {
                            cmd.push(TimelineCommand::BeginSelection {
                                clip_id: clip.id,
                                local_x: local(ptr),
                            });
                        }
                    } else {
                        if shift && resp.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
                        }
                        if resp.clicked() {
                            cmd.push(TimelineCommand::SelectClip(clip.id));
                            if let Some(ptr) = resp.interact_pointer_pos() {
                                let t = state.scale.px_to_time(ptr.x - rect.min.x);
                                cmd.push(TimelineCommand::Seek(t));
                            }
                        }
                    }
                }

                // ── Cut line follows the pointer while cut mode is armed ──
                if state.cut_mode {
                    if let Some(hover) = response.hover_pos() {
                        painter.extend(Shape::dashed_line(
                            &[
                                Pos2::new(hover.x, rect.min.y),
                                Pos2::new(hover.x, rect.max.y),
                            ],
                            Stroke::new(2.0, CUT_LINE),
                            6.0,
                            4.0,
                        ));
                    }
                }

                // ── Playhead ──────────────────────────────────────────────
                let ph_x = rect.min.x + state.playhead.position_px();
                painter.line_segment(
                    [Pos2::new(ph_x, rect.min.y), Pos2::new(ph_x, rect.max.y)],
                    Stroke::new(2.0, ACCENT),
                );
                let handle_center = Pos2::new(ph_x, rect.min.y + 9.0);
                painter.circle_filled(handle_center, 8.0, ACCENT);
                painter.circle_stroke(
                    handle_center,
                    8.0,
                    Stroke::new(2.0, Color32::from_rgb(120, 25, 25)),
                );

                let handle_rect = Rect::from_center_size(handle_center, egui::vec2(18.0, 18.0));
                let handle_resp =
                    ui.interact(handle_rect, Id::new("playhead_handle"), Sense::drag());
                if handle_resp.hovered() || handle_resp.dragged() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                }
                if handle_resp.drag_started() {
                    cmd.push(TimelineCommand::BeginPlayheadDrag);
                }
                if handle_resp.dragged() {
                    if let Some(ptr) = handle_resp.interact_pointer_pos() {
                        let px = (ptr.x - rect.min.x).max(0.0);
                        let t = state.scale.px_to_time(px);
                        self.emit_scrub(t, handle_resp.drag_started(), cmd, px);
                    }
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                }
                if handle_resp.drag_stopped() {
                    cmd.push(TimelineCommand::EndPlayheadDrag);
                }

                // ── Background click = seek ───────────────────────────────
                if response.clicked() && !state.cut_mode {
                    if let Some(ptr) = response.interact_pointer_pos() {
                        let t = state.scale.px_to_time((ptr.x - rect.min.x).max(0.0));
                        cmd.push(TimelineCommand::Seek(t));
                    }
                }

                total_w
            });

            self.content_width = output.inner;
            self.viewport = Viewport {
                left:  output.state.offset.x,
                width: output.inner_rect.width(),
            };
            self.auto_scroll(ui, state);
        });
    }
}

/// Truncates `text` to fit within `max_px` using a per-character width
/// heuristic (11px proportional ≈ 6.5 px/char average). Appends "…" when
/// truncated.
fn fit_label(text: &str, max_px: f32) -> String {
    const AVG_CHAR_PX: f32 = 6.5;
    let max_chars = (max_px / AVG_CHAR_PX).max(0.0) as usize;
    let char_count = text.chars().count();
    if char_count <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let keep = max_chars.saturating_sub(1);
    text.chars().take(keep).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::fit_label;

    #[test]
    fn fit_label_passes_short_names_through() {
        assert_eq!(fit_label("clip.mp4", 200.0), "clip.mp4");
    }

    #[test]
    fn fit_label_truncates_with_ellipsis() {
        let out = fit_label("a_very_long_source_name.mp4", 40.0);
        assert!(out.ends_with('…'));
        assert!(out.chars().count() <= 6);
    }

    #[test]
    fn fit_label_zero_width_is_empty() {
        assert_eq!(fit_label("anything", 0.0), "");
    }
}
