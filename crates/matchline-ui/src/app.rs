// crates/matchline-ui/src/app.rs
use eframe::egui;
use rfd::FileDialog;
use uuid::Uuid;

use matchline_core::commands::TimelineCommand;
use matchline_core::events::TimelineEvent;
use matchline_core::timeline::TimelineState;
use matchline_media::PlayerWorker;

use crate::context::PlayerContext;
use crate::modules::{player::PlayerPanel, timeline::TimelinePanel, Panel};
use crate::theme::{configure_style, ACCENT};

/// Quick actions surfaced in the top bar: (event_type, label, lookback secs).
/// Mirrors the annotation collaborator's stock catalogue.
const QUICK_ACTIONS: [(&str, &str, f64); 4] = [
    ("goal", "GOAL", 8.0),
    ("counter", "Counter", 6.0),
    ("press_start", "Press", 10.0),
    ("turnover", "Turnover", 5.0),
];

pub struct MatchlineApp {
    state:    TimelineState,
    context:  PlayerContext,
    timeline: TimelinePanel,
    player:   PlayerPanel,
    /// Commands emitted by panels each frame, processed after the UI pass.
    pending_cmds: Vec<TimelineCommand>,
}

impl MatchlineApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        configure_style(&cc.egui_ctx);
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        Self {
            state:    TimelineState::new(),
            context:  PlayerContext::new(PlayerWorker::new()),
            timeline: TimelinePanel::new(),
            player:   PlayerPanel::new(),
            pending_cmds: Vec::new(),
        }
    }

    fn process_command(&mut self, cmd: TimelineCommand) {
        match cmd {
            // ── Playback ─────────────────────────────────────────────────────
            TimelineCommand::Play => {
                if !self.state.has_source() {
                    self.state.status = Some("No video loaded".into());
                    return;
                }
                self.context.worker.play();
                self.state.is_playing = true;
                self.state.keyboard_nav = false;
            }
            TimelineCommand::Pause => {
                self.context.worker.pause();
                self.state.is_playing = false;
            }
            TimelineCommand::Stop => {
                if self.state.has_source() {
                    self.context.worker.pause();
                    self.context.worker.seek(0.0);
                }
                self.state.is_playing = false;
                self.state.set_playhead_time(0.0);
                self.state.current_time = 0.0;
                self.state.current_frame = 0;
            }
            TimelineCommand::Seek(t) => {
                // Guard at the controller boundary: seeks before a source is
                // loaded are no-ops.
                let Some(duration) = self.source_duration_secs() else { return };
                let t = t.clamp(0.0, duration);
                self.context.worker.seek(t);
                self.state.set_playhead_time(t);
                self.state.keyboard_nav = false;
            }
            TimelineCommand::SetSpeed(multiplier) => {
                if multiplier > 0.0 {
                    self.state.speed = multiplier;
                    self.context.worker.set_speed(multiplier);
                }
            }
            TimelineCommand::StepFrame => {
                if self.state.has_source() {
                    self.state.is_playing = false;
                    self.context.worker.step();
                }
            }
            TimelineCommand::NudgeFrame(frames) => {
                let Some(source) = self.state.source.as_ref() else { return };
                let (fps, duration) = (source.fps.max(1.0), source.duration_ms / 1000.0);
                let t = (self.state.current_time + frames as f64 / fps).clamp(0.0, duration);
                self.context.worker.pause();
                self.state.is_playing = false;
                self.state.keyboard_nav = true;
                self.context.worker.seek(t);
                self.state.set_playhead_time(t);
            }
            TimelineCommand::JumpToStart => self.process_command(TimelineCommand::Seek(0.0)),
            TimelineCommand::JumpToEnd => {
                if let Some(duration) = self.source_duration_secs() {
                    self.process_command(TimelineCommand::Seek(duration));
                }
            }

            // ── Playhead drag ────────────────────────────────────────────────
            TimelineCommand::BeginPlayheadDrag => {
                self.state.playhead.begin_drag();
                self.state.keyboard_nav = false;
            }
            TimelineCommand::DragPlayheadTo(px) => {
                let width = self.state.timeline_width();
                let px = self.state.playhead.drag_to(px, width);
                let t = self.state.scale.px_to_time(px);
                if !self.state.has_source() {
                    return;
                }
                if self.state.is_playing {
                    // Deferred seek: the decoder gets one seek at drag end
                    // instead of a seek per pointer move.
                    self.context.deferred_seek = Some(t);
                } else {
                    self.context.worker.seek(t);
                }
            }
            TimelineCommand::EndPlayheadDrag => {
                if self.state.playhead.end_drag().is_some() {
                    if let Some(t) = self.context.deferred_seek.take() {
                        self.context.worker.seek(t);
                    }
                }
            }

            // ── Source ───────────────────────────────────────────────────────
            TimelineCommand::OpenVideo(path) => {
                self.state.status = Some("Loading…".into());
                self.context.frame_tex = None;
                self.context.worker.load(Uuid::new_v4(), path);
            }

            // ── Timeline structure ───────────────────────────────────────────
            TimelineCommand::SelectClip(id) => {
                self.state.set_active(id);
                self.state.keyboard_nav = false;
            }
            TimelineCommand::RemoveClip(id) => {
                self.state.remove_clip(id);
            }
            TimelineCommand::SplitAt { clip_id, local_x } => {
                self.state.split_clip_at(clip_id, local_x);
                // One cut per arm, hit or miss.
                self.state.cut_mode = false;
            }
            TimelineCommand::SetCutMode(enabled) => {
                self.state.cut_mode = enabled;
            }

            // ── Zoom ─────────────────────────────────────────────────────────
            TimelineCommand::SetZoom(level) => self.state.set_zoom_level(level),
            TimelineCommand::ZoomIn => self.state.zoom_in(),
            TimelineCommand::ZoomOut => self.state.zoom_out(),
            TimelineCommand::ZoomFit => self.state.zoom_fit(),

            // ── Partial selection ────────────────────────────────────────────
            TimelineCommand::BeginSelection { clip_id, local_x } => {
                self.state.begin_selection(clip_id, local_x);
            }
            TimelineCommand::UpdateSelection { clip_id, local_x } => {
                self.state.update_selection(clip_id, local_x);
            }
            TimelineCommand::EndSelection { clip_id } => {
                self.state.end_selection(clip_id);
            }
            TimelineCommand::SetSelectionRange { clip_id, start_ms, end_ms } => {
                self.state.set_selection_range(clip_id, start_ms, end_ms);
            }
            TimelineCommand::ClearSelection(clip_id) => {
                self.state.clear_selection(clip_id);
            }

            // ── Annotation ───────────────────────────────────────────────────
            TimelineCommand::AttachMarker { start_ms, end_ms, label, event_type } => {
                self.state.attach_marker(start_ms, end_ms, label, event_type);
            }
            TimelineCommand::QuickAction { event_type, label, lookback_secs } => {
                self.state.quick_action(event_type, label, lookback_secs);
            }

            // ── Status ───────────────────────────────────────────────────────
            TimelineCommand::ClearStatus => {
                self.state.status = None;
            }
        }
    }

    fn source_duration_secs(&self) -> Option<f64> {
        self.state.source.as_ref().map(|s| s.duration_ms / 1000.0)
    }

    /// Hand outbound timeline events to their collaborators. The annotation
    /// panel and persistence layer subscribe here; for now the hook logs.
    fn deliver_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                TimelineEvent::SelectionCommitted { clip_id, start_ms, end_ms } => {
                    eprintln!(
                        "[timeline] selection committed on {clip_id}: {start_ms:.0}–{end_ms:.0}ms"
                    );
                }
                TimelineEvent::MarkerAttached { marker } => {
                    eprintln!(
                        "[timeline] marker '{}' ({}) on {}",
                        marker.label, marker.event_type, marker.clip_id
                    );
                }
                TimelineEvent::StructureChanged => {
                    eprintln!("[timeline] layout changed: {} clips", self.state.clips.len());
                }
            }
        }
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for MatchlineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.context.ingest_player_events(&mut self.state, ctx);

        egui::TopBottomPanel::top("top_panel")
            .exact_height(36.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("Matchline")
                            .strong()
                            .size(15.0)
                            .color(ACCENT),
                    );
                    ui.separator();
                    if ui.button("📂 Open Video").clicked() {
                        if let Some(path) = FileDialog::new()
                            .add_filter("Videos", &["mp4", "avi", "mov", "mkv", "flv"])
                            .pick_file()
                        {
                            self.pending_cmds.push(TimelineCommand::OpenVideo(path));
                        }
                    }
                    ui.separator();

                    // Quick tactical actions: mark the window that just
                    // happened on the active clip.
                    let enabled = self.state.has_source();
                    for (event_type, label, lookback) in QUICK_ACTIONS {
                        let style = self.state.catalogue.style(event_type);
                        let [r, g, b] = style.color;
                        let button = egui::Button::new(
                            egui::RichText::new(format!("{} {label}", style.icon)).size(11.0),
                        )
                        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(r, g, b)));
                        if ui.add_enabled(enabled, button).clicked() {
                            self.pending_cmds.push(TimelineCommand::QuickAction {
                                event_type:    event_type.into(),
                                label:         label.into(),
                                lookback_secs: lookback,
                            });
                        }
                    }
                });
            });

        egui::TopBottomPanel::bottom("timeline_panel")
            .resizable(true)
            .min_height(170.0)
            .default_height(220.0)
            .show(ctx, |ui| {
                self.timeline.ui(
                    ui,
                    &self.state,
                    self.context.frame_tex.as_ref(),
                    &mut self.pending_cmds,
                );
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.player.ui(
                ui,
                &self.state,
                self.context.frame_tex.as_ref(),
                &mut self.pending_cmds,
            );
        });

        // ── Process commands emitted by panels this frame ────────────────────
        let cmds: Vec<TimelineCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }
        self.deliver_events();

        // The decode thread produces while we sleep — keep draining at frame
        // rate during playback so position reports land promptly.
        if self.state.is_playing {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        }
    }
}
