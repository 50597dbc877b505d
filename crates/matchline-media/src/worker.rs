// crates/matchline-media/src/worker.rs
//
// PlayerWorker: owns the playback decode thread. All public API that
// matchline-ui calls lives here.
//
// The thread owns the FrameSource and the read cursor; the interactive
// surface owns the command channel. While playing, the loop reads one frame,
// hands it off, reports the position and sleeps one (speed-scaled) frame
// interval; while paused it blocks on the command channel with a coarse
// timeout so cancellation and late commands are observed within the poll
// interval without busy-spinning.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use uuid::Uuid;

use matchline_core::media_types::{PlaybackFrame, PlayerCommand, PlayerEvent, PositionReport};

use crate::decode::ClipDecoder;
use crate::source::FrameSource;

/// Poll interval while paused. Bounds how stale a command can get before the
/// thread observes it.
pub const IDLE_POLL_MS: u64 = 100;

/// Floor on the inter-frame sleep. Extreme speed multipliers may not push
/// pacing below this.
pub const MIN_FRAME_DELAY_MS: f64 = 1.0;

/// Frame channel capacity. Frames are dropped (not blocked on) when the
/// interactive surface falls behind — backpressure is drop-if-full.
const FRAME_CHANNEL_CAP: usize = 32;

/// Event channel capacity. Position reports drop when full; terminal events
/// (Loaded / Ended / Error) always go through.
const EVENT_CHANNEL_CAP: usize = 256;

const CMD_CHANNEL_CAP: usize = 32;

/// Inter-frame sleep in milliseconds: source-native delay rescaled by the
/// speed multiplier, floored at MIN_FRAME_DELAY_MS.
pub fn frame_delay_ms(fps: f64, speed: f64) -> f64 {
    (1000.0 / fps.max(1.0) / speed).max(MIN_FRAME_DELAY_MS)
}

// ── Worker ────────────────────────────────────────────────────────────────────

pub struct PlayerWorker {
    cmd_tx: Sender<PlayerCommand>,
    /// Decoded frames, ownership transferred on receive.
    pub frame_rx: Receiver<PlaybackFrame>,
    /// Position reports and session lifecycle events.
    pub event_rx: Receiver<PlayerEvent>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PlayerWorker {
    /// Production worker: sources are opened with the FFmpeg-backed decoder.
    pub fn new() -> Self {
        Self::spawn_with(|_, path: &Path| ClipDecoder::open(path))
    }

    /// Spawn the playback thread with a custom source opener. Tests inject a
    /// synthetic FrameSource here and drive the real loop and channels.
    pub fn spawn_with<S, F>(open: F) -> Self
    where
        S: FrameSource + 'static,
        F: FnMut(Uuid, &Path) -> Result<S> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = bounded(CMD_CHANNEL_CAP);
        let (frame_tx, frame_rx) = bounded(FRAME_CHANNEL_CAP);
        let (event_tx, event_rx) = bounded(EVENT_CHANNEL_CAP);

        let handle = thread::spawn(move || {
            run_loop(open, cmd_rx, frame_tx, event_tx);
        });

        Self {
            cmd_tx,
            frame_rx,
            event_rx,
            handle: Some(handle),
        }
    }

    pub fn load(&self, source: Uuid, path: PathBuf) {
        let _ = self.cmd_tx.send(PlayerCommand::Load { source, path });
    }

    pub fn play(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Play);
    }

    pub fn pause(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Pause);
    }

    pub fn seek(&self, time_secs: f64) {
        let _ = self.cmd_tx.send(PlayerCommand::Seek(time_secs));
    }

    pub fn set_speed(&self, multiplier: f64) {
        let _ = self.cmd_tx.send(PlayerCommand::SetSpeed(multiplier));
    }

    pub fn step(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Step);
    }
}

impl Drop for PlayerWorker {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ── Decode loop ───────────────────────────────────────────────────────────────

struct Session<S> {
    source:  Uuid,
    src:     S,
    playing: bool,
    speed:   f64,
}

enum Flow {
    Continue,
    Exit,
}

fn run_loop<S, F>(
    mut open: F,
    cmd_rx: Receiver<PlayerCommand>,
    frame_tx: Sender<PlaybackFrame>,
    event_tx: Sender<PlayerEvent>,
) where
    S: FrameSource,
    F: FnMut(Uuid, &Path) -> Result<S>,
{
    let mut session: Option<Session<S>> = None;

    loop {
        let playing = session.as_ref().map(|s| s.playing).unwrap_or(false);

        if playing {
            // Drain control between frames without blocking the decode pace.
            match cmd_rx.try_recv() {
                Ok(cmd) => {
                    match handle_cmd(cmd, &mut session, &mut open, &frame_tx, &event_tx) {
                        Flow::Exit => return,
                        Flow::Continue => continue,
                    }
                }
                Err(TryRecvError::Disconnected) => return,
                Err(TryRecvError::Empty) => {}
            }

            let sess = session.as_mut().unwrap();
            match sess.src.read_frame() {
                Some(frame) => {
                    let report = PositionReport {
                        time_secs:    frame.time_secs,
                        frame_number: frame.frame_number,
                    };
                    // Drop-if-full: a stalled consumer loses frames, never
                    // stalls the decode cursor.
                    let _ = frame_tx.try_send(PlaybackFrame {
                        source: sess.source,
                        width:  frame.width,
                        height: frame.height,
                        data:   frame.data,
                        time_secs: frame.time_secs,
                        frame_number: frame.frame_number,
                    });
                    let _ = event_tx.try_send(PlayerEvent::Position(report));
                    let delay = frame_delay_ms(sess.src.fps(), sess.speed);
                    thread::sleep(Duration::from_secs_f64(delay / 1000.0));
                }
                None => {
                    sess.playing = false;
                    let _ = event_tx.send(PlayerEvent::Ended);
                }
            }
        } else {
            match cmd_rx.recv_timeout(Duration::from_millis(IDLE_POLL_MS)) {
                Ok(cmd) => {
                    if let Flow::Exit =
                        handle_cmd(cmd, &mut session, &mut open, &frame_tx, &event_tx)
                    {
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {} // idle poll — stay responsive
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }
}

fn handle_cmd<S, F>(
    cmd: PlayerCommand,
    session: &mut Option<Session<S>>,
    open: &mut F,
    frame_tx: &Sender<PlaybackFrame>,
    event_tx: &Sender<PlayerEvent>,
) -> Flow
where
    S: FrameSource,
    F: FnMut(Uuid, &Path) -> Result<S>,
{
    match cmd {
        PlayerCommand::Load { source, path } => match open(source, &path) {
            Ok(src) => {
                let _ = event_tx.send(PlayerEvent::Loaded {
                    source,
                    path,
                    duration_secs: src.duration_secs(),
                    fps:           src.fps(),
                    frame_count:   src.frame_count(),
                });
                let mut sess = Session { source, src, playing: false, speed: 1.0 };
                // Show the first frame while paused, cursor left at 0.
                peek(&mut sess, frame_tx, event_tx);
                *session = Some(sess);
            }
            Err(e) => {
                let _ = event_tx.send(PlayerEvent::Error {
                    msg: format!("cannot open {}: {e}", path.display()),
                });
                *session = None;
            }
        },

        PlayerCommand::Play => {
            if let Some(sess) = session {
                sess.playing = true;
            }
        }

        PlayerCommand::Pause => {
            if let Some(sess) = session {
                sess.playing = false;
            }
        }

        PlayerCommand::Seek(t) => {
            if let Some(sess) = session {
                // Cursor repositions before the next read — no partial frame
                // from the stale position can be delivered.
                sess.src.seek(t.max(0.0));
                if !sess.playing {
                    peek(sess, frame_tx, event_tx);
                }
            }
        }

        PlayerCommand::SetSpeed(multiplier) => {
            if multiplier > 0.0 {
                if let Some(sess) = session {
                    sess.speed = multiplier;
                }
            } else {
                let _ = event_tx.send(PlayerEvent::Error {
                    msg: format!("speed multiplier must be > 0 (got {multiplier})"),
                });
            }
        }

        PlayerCommand::Step => {
            if let Some(sess) = session {
                sess.playing = false;
                peek(sess, frame_tx, event_tx);
            }
        }

        PlayerCommand::Shutdown => return Flow::Exit,
    }
    Flow::Continue
}

/// Paused single-frame peek: decode one frame for display, then rewind the
/// cursor so repeated peeks deliver the same frame.
fn peek<S: FrameSource>(
    sess: &mut Session<S>,
    frame_tx: &Sender<PlaybackFrame>,
    event_tx: &Sender<PlayerEvent>,
) {
    if let Some(frame) = sess.src.read_frame() {
        sess.src.rewind_frame();
        let report = PositionReport {
            time_secs:    frame.time_secs,
            frame_number: frame.frame_number,
        };
        let _ = frame_tx.try_send(PlaybackFrame {
            source: sess.source,
            width:  frame.width,
            height: frame.height,
            data:   frame.data,
            time_secs: frame.time_secs,
            frame_number: frame.frame_number,
        });
        let _ = event_tx.try_send(PlayerEvent::Position(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFrame;

    /// Deterministic in-memory source: N frames at a fixed rate.
    struct SyntheticSource {
        fps:    f64,
        frames: u64,
        cursor: u64,
    }

    impl SyntheticSource {
        fn new(fps: f64, frames: u64) -> Self {
            Self { fps, frames, cursor: 0 }
        }
    }

    impl FrameSource for SyntheticSource {
        fn fps(&self) -> f64 {
            self.fps
        }

        fn frame_count(&self) -> u64 {
            self.frames
        }

        fn duration_secs(&self) -> f64 {
            self.frames as f64 / self.fps
        }

        fn read_frame(&mut self) -> Option<SourceFrame> {
            if self.cursor >= self.frames {
                return None;
            }
            let n = self.cursor;
            self.cursor += 1;
            Some(SourceFrame {
                data:         vec![0u8; 16],
                width:        2,
                height:       2,
                time_secs:    n as f64 / self.fps,
                frame_number: n,
            })
        }

        fn seek(&mut self, time_secs: f64) {
            self.cursor = ((time_secs * self.fps).round() as u64).min(self.frames);
        }

        fn rewind_frame(&mut self) {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    fn test_worker(frames: u64) -> PlayerWorker {
        PlayerWorker::spawn_with(move |_, path: &Path| {
            if path.ends_with("bad.mp4") {
                anyhow::bail!("unreadable source");
            }
            Ok(SyntheticSource::new(30.0, frames))
        })
    }

    fn recv_event(worker: &PlayerWorker) -> PlayerEvent {
        worker
            .event_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("event within 2s")
    }

    fn wait_for_loaded(worker: &PlayerWorker) {
        loop {
            if let PlayerEvent::Loaded { .. } = recv_event(worker) {
                return;
            }
        }
    }

    #[test]
    fn set_speed_rescales_frame_delay() {
        assert!((frame_delay_ms(30.0, 1.0) - 33.33).abs() < 0.01);
        assert!((frame_delay_ms(30.0, 2.0) - 16.67).abs() < 0.01);
        assert!((frame_delay_ms(30.0, 0.5) - 66.67).abs() < 0.01);
    }

    #[test]
    fn frame_delay_never_drops_below_floor() {
        assert_eq!(frame_delay_ms(30.0, 1e9), MIN_FRAME_DELAY_MS);
        assert_eq!(frame_delay_ms(240.0, 100.0), MIN_FRAME_DELAY_MS);
    }

    #[test]
    fn load_reports_session_metadata_and_first_frame() {
        let worker = test_worker(150);
        worker.load(Uuid::new_v4(), PathBuf::from("good.mp4"));

        match recv_event(&worker) {
            PlayerEvent::Loaded { duration_secs, fps, frame_count, .. } => {
                assert!((duration_secs - 5.0).abs() < 1e-9);
                assert_eq!(fps, 30.0);
                assert_eq!(frame_count, 150);
            }
            other => panic!("expected Loaded, got {other:?}"),
        }
        // Initial paused peek shows frame 0.
        match recv_event(&worker) {
            PlayerEvent::Position(report) => assert_eq!(report.frame_number, 0),
            other => panic!("expected Position, got {other:?}"),
        }
        let frame = worker
            .frame_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("first frame");
        assert_eq!(frame.frame_number, 0);
    }

    #[test]
    fn playback_emits_ordered_positions_then_ends() {
        let worker = test_worker(5);
        worker.load(Uuid::new_v4(), PathBuf::from("good.mp4"));
        wait_for_loaded(&worker);
        worker.play();

        let mut positions = Vec::new();
        loop {
            match recv_event(&worker) {
                PlayerEvent::Position(report) => positions.push(report.frame_number),
                PlayerEvent::Ended => break,
                other => panic!("unexpected event {other:?}"),
            }
        }
        // Initial peek frame 0, then the full pass 0..5.
        assert_eq!(positions, vec![0, 0, 1, 2, 3, 4]);
        // EOS stops emission: no further events arrive.
        assert!(worker
            .event_rx
            .recv_timeout(Duration::from_millis(300))
            .is_err());
    }

    #[test]
    fn seek_repositions_cursor_and_peeks_while_paused() {
        let worker = test_worker(300);
        worker.load(Uuid::new_v4(), PathBuf::from("good.mp4"));
        wait_for_loaded(&worker);
        // Drain the initial peek.
        let _ = recv_event(&worker);
        while worker.frame_rx.try_recv().is_ok() {}

        worker.seek(2.0);
        match recv_event(&worker) {
            PlayerEvent::Position(report) => {
                assert_eq!(report.frame_number, 60);
                assert!((report.time_secs - 2.0).abs() < 0.001);
            }
            other => panic!("expected Position, got {other:?}"),
        }
        let frame = worker
            .frame_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("peeked frame");
        assert_eq!(frame.frame_number, 60);
    }

    #[test]
    fn paused_step_is_idempotent() {
        let worker = test_worker(300);
        worker.load(Uuid::new_v4(), PathBuf::from("good.mp4"));
        wait_for_loaded(&worker);
        let _ = recv_event(&worker); // initial peek

        worker.step();
        worker.step();
        let first = match recv_event(&worker) {
            PlayerEvent::Position(r) => r.frame_number,
            other => panic!("expected Position, got {other:?}"),
        };
        let second = match recv_event(&worker) {
            PlayerEvent::Position(r) => r.frame_number,
            other => panic!("expected Position, got {other:?}"),
        };
        assert_eq!(first, second);
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let worker = test_worker(300);
        worker.load(Uuid::new_v4(), PathBuf::from("good.mp4"));
        wait_for_loaded(&worker);
        let _ = recv_event(&worker); // initial peek

        worker.set_speed(0.0);
        match recv_event(&worker) {
            PlayerEvent::Error { msg } => assert!(msg.contains("must be > 0")),
            other => panic!("expected Error, got {other:?}"),
        }
        worker.set_speed(-2.0);
        assert!(matches!(recv_event(&worker), PlayerEvent::Error { .. }));

        // A valid multiplier produces no error.
        worker.set_speed(2.0);
        assert!(worker
            .event_rx
            .recv_timeout(Duration::from_millis(300))
            .is_err());
    }

    #[test]
    fn unreadable_source_surfaces_error_and_worker_survives() {
        let worker = test_worker(300);
        worker.load(Uuid::new_v4(), PathBuf::from("bad.mp4"));
        match recv_event(&worker) {
            PlayerEvent::Error { msg } => assert!(msg.contains("bad.mp4")),
            other => panic!("expected Error, got {other:?}"),
        }
        // The thread is still serving: a good source loads afterwards.
        worker.load(Uuid::new_v4(), PathBuf::from("good.mp4"));
        assert!(matches!(recv_event(&worker), PlayerEvent::Loaded { .. }));
    }

    #[test]
    fn commands_before_load_are_noops() {
        let worker = test_worker(300);
        worker.play();
        worker.seek(3.0);
        worker.step();
        assert!(worker
            .event_rx
            .recv_timeout(Duration::from_millis(300))
            .is_err());
    }

    #[test]
    fn shutdown_joins_the_thread() {
        let worker = test_worker(5);
        worker.load(Uuid::new_v4(), PathBuf::from("good.mp4"));
        worker.play();
        drop(worker); // Drop sends Shutdown and joins without hanging
    }
}
