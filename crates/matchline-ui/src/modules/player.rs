// crates/matchline-ui/src/modules/player.rs
//
// The player panel: current decoded frame, aspect-correct, plus the
// transport (jump/step/play/stop, speed multiplier, time readout). Frames
// arrive as textures from PlayerContext; this panel only displays and emits
// commands.

use egui::{Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke, TextureHandle, Ui};

use matchline_core::commands::TimelineCommand;
use matchline_core::helpers::time::format_time_long;
use matchline_core::timeline::TimelineState;

use super::Panel;
use crate::theme::{ACCENT, DARK_BG_2, DARK_BORDER, DARK_TEXT_DIM};

const SPEEDS: [f64; 5] = [0.25, 0.5, 1.0, 1.5, 2.0];

pub struct PlayerPanel;

impl PlayerPanel {
    pub fn new() -> Self {
        Self
    }
}

impl Panel for PlayerPanel {
    fn name(&self) -> &str {
        "Player"
    }

    fn ui(
        &mut self,
        ui:    &mut Ui,
        state: &TimelineState,
        frame: Option<&TextureHandle>,
        cmd:   &mut Vec<TimelineCommand>,
    ) {
        ui.vertical(|ui| {
            // ── Video canvas (centered, aspect-ratio correct) ─────────────
            let controls_h = 42.0;
            let panel_w = ui.available_width();
            let panel_h = (ui.available_height() - controls_h - 8.0).max(80.0);

            let ratio = frame
                .map(|t| t.size_vec2().x / t.size_vec2().y.max(1.0))
                .unwrap_or(16.0 / 9.0);
            let (canvas_w, canvas_h) = {
                let w = panel_w;
                let h = w / ratio;
                if h <= panel_h { (w, h) } else { (panel_h * ratio, panel_h) }
            };

            let (outer_rect, _) =
                ui.allocate_exact_size(egui::vec2(panel_w, panel_h), Sense::hover());
            let rect = Rect::from_center_size(
                outer_rect.center(),
                egui::vec2(canvas_w, canvas_h),
            );
            let painter = ui.painter();

            if state.is_playing {
                painter.rect_stroke(
                    rect.expand(2.0),
                    4,
                    Stroke::new(1.5, ACCENT.gamma_multiply(0.6)),
                    egui::StrokeKind::Outside,
                );
            } else {
                painter.rect_stroke(
                    rect.expand(1.0),
                    4,
                    Stroke::new(1.0, DARK_BORDER),
                    egui::StrokeKind::Outside,
                );
            }
            painter.rect_filled(rect, 3.0, Color32::BLACK);

            if let Some(tex) = frame {
                painter.image(
                    tex.id(),
                    rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            } else {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "Open a video to start",
                    FontId::proportional(13.0),
                    DARK_TEXT_DIM,
                );
            }

            // Frame-number badge, decode-thread truth.
            if state.has_source() {
                painter.text(
                    Pos2::new(rect.min.x + 6.0, rect.max.y - 6.0),
                    Align2::LEFT_BOTTOM,
                    format!("frame {}", state.current_frame),
                    FontId::monospace(9.0),
                    Color32::from_gray(170),
                );
            }

            ui.add_space(4.0);

            // ── Transport ─────────────────────────────────────────────────
            egui::Frame::new()
                .fill(DARK_BG_2)
                .inner_margin(egui::Margin::same(6))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let loaded = state.has_source();

                        if ui.add_enabled(loaded, egui::Button::new("⏮")).clicked() {
                            cmd.push(TimelineCommand::JumpToStart);
                        }
                        let play_label = if state.is_playing { "⏸" } else { "▶" };
                        if ui.add_enabled(loaded, egui::Button::new(play_label)).clicked() {
                            cmd.push(if state.is_playing {
                                TimelineCommand::Pause
                            } else {
                                TimelineCommand::Play
                            });
                        }
                        if ui.add_enabled(loaded, egui::Button::new("⏹")).clicked() {
                            cmd.push(TimelineCommand::Stop);
                        }
                        if ui
                            .add_enabled(loaded, egui::Button::new("🎞"))
                            .on_hover_text("Redisplay the current frame while paused")
                            .clicked()
                        {
                            cmd.push(TimelineCommand::StepFrame);
                        }
                        if ui.add_enabled(loaded, egui::Button::new("⏭")).clicked() {
                            cmd.push(TimelineCommand::JumpToEnd);
                        }

                        ui.separator();

                        let mut speed = state.speed;
                        egui::ComboBox::from_id_salt("speed")
                            .width(70.0)
                            .selected_text(format!("{speed}×"))
                            .show_ui(ui, |ui| {
                                for s in SPEEDS {
                                    ui.selectable_value(&mut speed, s, format!("{s}×"));
                                }
                            });
                        if speed != state.speed {
                            cmd.push(TimelineCommand::SetSpeed(speed));
                        }

                        // ── Time readout ──────────────────────────────────
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                let total = state
                                    .source
                                    .as_ref()
                                    .map(|s| s.duration_ms)
                                    .unwrap_or(0.0);
                                ui.label(
                                    RichText::new(format!(
                                        "{} / {}",
                                        format_time_long(state.current_time * 1000.0),
                                        format_time_long(total),
                                    ))
                                    .monospace()
                                    .size(11.0),
                                );
                            },
                        );
                    });
                });
        });
    }
}
