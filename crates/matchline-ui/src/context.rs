// crates/matchline-ui/src/context.rs
//
// PlayerContext owns all runtime handles that are NOT part of the timeline
// state: the decode worker, its channels, the current frame texture and the
// deferred-seek slot used while scrubbing during playback. MatchlineApp
// holds one of these plus a TimelineState and the panel list — nothing else.

use eframe::egui;
use matchline_core::timeline::{LoadedSource, TimelineState};
use matchline_media::{PlayerEvent, PlayerWorker};

use crate::helpers::log::mlog;

pub struct PlayerContext {
    pub worker: PlayerWorker,

    /// Latest decoded frame, uploaded as a texture. Ownership of the frame
    /// buffer transferred here on receive; the decode side never sees it
    /// again.
    pub frame_tex: Option<egui::TextureHandle>,

    /// Seek accumulated during a playhead drag while playing. The decoder
    /// receives one seek at drag end instead of one per pointer move —
    /// live-seeking a playing decoder on every move thrashes the demuxer.
    pub deferred_seek: Option<f64>,
}

impl PlayerContext {
    pub fn new(worker: PlayerWorker) -> Self {
        Self {
            worker,
            frame_tex: None,
            deferred_seek: None,
        }
    }

    /// Drain both worker channels. Called once per frame before the UI pass
    /// so panels render against current state.
    pub fn ingest_player_events(
        &mut self,
        state: &mut TimelineState,
        ctx:   &egui::Context,
    ) {
        // Frames: keep the newest, drop the rest — the worker paces emission
        // at the source frame rate, so a backlog means we fell behind.
        let mut latest = None;
        while let Ok(frame) = self.worker.frame_rx.try_recv() {
            latest = Some(frame);
        }
        if let Some(frame) = latest {
            self.frame_tex = Some(ctx.load_texture(
                "player-frame",
                egui::ColorImage::from_rgba_unmultiplied(
                    [frame.width as usize, frame.height as usize],
                    &frame.data,
                ),
                egui::TextureOptions::LINEAR,
            ));
            ctx.request_repaint();
        }

        while let Ok(event) = self.worker.event_rx.try_recv() {
            match event {
                PlayerEvent::Loaded { source, path, duration_secs, fps, frame_count } => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "video".into());
                    mlog(&format!(
                        "[player] loaded {name}: {duration_secs:.2}s @ {fps:.2}fps"
                    ));
                    state.load_source(LoadedSource {
                        id: source,
                        path,
                        name,
                        duration_ms: duration_secs * 1000.0,
                        fps,
                        frame_count,
                    });
                    ctx.request_repaint();
                }

                PlayerEvent::Position(report) => {
                    if state.apply_position_report(report) {
                        ctx.request_repaint();
                    }
                }

                PlayerEvent::Ended => {
                    state.is_playing = false;
                    state.status = Some("End of video".into());
                    ctx.request_repaint();
                }

                PlayerEvent::Error { msg } => {
                    // Decode failure stops playback locally; the controller
                    // stays usable for the next source.
                    eprintln!("[player] {msg}");
                    state.is_playing = false;
                    state.status = Some(msg);
                    ctx.request_repaint();
                }
            }
        }
    }
}
