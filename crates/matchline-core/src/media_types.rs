// crates/matchline-core/src/media_types.rs
//
// Types that flow across the channels between matchline-media and
// matchline-ui. No egui, no ffmpeg — just plain data. Frame buffers are
// owned Vec<u8>s: ownership transfers to the interactive surface on handoff
// and the decode side never touches a buffer again after sending it.

use std::path::PathBuf;
use uuid::Uuid;

/// A decoded frame from the playback pipeline. RGBA, tightly packed.
pub struct PlaybackFrame {
    pub source:       Uuid,
    pub width:        u32,
    pub height:       u32,
    pub data:         Vec<u8>,
    pub time_secs:    f64,
    pub frame_number: u64,
}

/// Where the decode cursor is, reported once per emitted frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionReport {
    pub time_secs:    f64,
    pub frame_number: u64,
}

/// Control messages into the player thread. Single-writer: only the
/// interactive surface sends these.
#[derive(Clone, Debug)]
pub enum PlayerCommand {
    /// Open a source and reset the decode session. Replaces any previous one.
    Load { source: Uuid, path: PathBuf },
    Play,
    Pause,
    /// Reposition the read cursor, seconds from source start. Valid whether
    /// playing or paused; while paused the frame at the target is emitted.
    Seek(f64),
    /// Playback-rate multiplier. Must be > 0 — rejected otherwise.
    SetSpeed(f64),
    /// Paused single-frame peek: decode one frame, then rewind the cursor so
    /// repeated steps are idempotent until Play advances it.
    Step,
    Shutdown,
}

/// Results from the player thread. Single-writer: only the decode side sends
/// these; the interactive surface drains them on its own schedule.
#[derive(Debug)]
pub enum PlayerEvent {
    /// Source opened; session reset and paused at t=0.
    Loaded {
        source:        Uuid,
        path:          PathBuf,
        duration_secs: f64,
        fps:           f64,
        frame_count:   u64,
    },
    Position(PositionReport),
    /// End of stream — the session set is_playing=false and stopped emitting.
    Ended,
    /// Decode failure. Playback stops locally; the controller stays usable.
    Error { msg: String },
}
