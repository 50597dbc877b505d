// crates/matchline-core/src/commands.rs
//
// Every user action in Matchline is expressed as a TimelineCommand.
// Panels emit these; the app processes them after the UI pass.
// Adding a new interaction = add a variant here + one match arm in app.rs.

use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum TimelineCommand {
    // ── Playback ─────────────────────────────────────────────────────────────
    Play,
    Pause,
    /// Pause, seek to 0 and park the playhead at the left edge.
    Stop,
    /// Seek to an absolute source time in seconds. No-op before a source is
    /// loaded — guarded at the controller boundary.
    Seek(f64),
    /// Playback-rate multiplier, forwarded to the decode session.
    SetSpeed(f64),
    /// Paused single-frame step (decode one, rewind cursor).
    StepFrame,
    /// Keyboard frame nudge: ± n frames from the current position. Marks the
    /// last input as keyboard navigation for the paging auto-scroll policy.
    NudgeFrame(i64),
    JumpToStart,
    JumpToEnd,

    // ── Playhead drag ────────────────────────────────────────────────────────
    BeginPlayheadDrag,
    /// Pointer-move during a drag, scene pixels. Live-seeks while paused;
    /// while playing the seek is deferred to EndPlayheadDrag.
    DragPlayheadTo(f32),
    EndPlayheadDrag,

    // ── Source ───────────────────────────────────────────────────────────────
    OpenVideo(PathBuf),

    // ── Timeline structure ───────────────────────────────────────────────────
    SelectClip(Uuid),
    RemoveClip(Uuid),
    /// Split the clip at a local pixel offset. Out-of-bounds split points are
    /// silently rejected (pointer drift near edges).
    SplitAt { clip_id: Uuid, local_x: f32 },
    /// Arm or disarm cut mode — changes click semantics from seek to split.
    SetCutMode(bool),

    // ── Zoom ─────────────────────────────────────────────────────────────────
    /// Slider level 0..=100, mapped linearly onto [MIN_PPS, MAX_PPS].
    SetZoom(u8),
    ZoomIn,
    ZoomOut,
    ZoomFit,

    // ── Partial selection ────────────────────────────────────────────────────
    BeginSelection { clip_id: Uuid, local_x: f32 },
    UpdateSelection { clip_id: Uuid, local_x: f32 },
    EndSelection { clip_id: Uuid },
    /// Programmatic selection from a collaborator, source milliseconds.
    SetSelectionRange { clip_id: Uuid, start_ms: f64, end_ms: f64 },
    ClearSelection(Uuid),

    // ── Annotation ───────────────────────────────────────────────────────────
    /// Attach a marker to the active clip, source milliseconds.
    AttachMarker {
        start_ms:   f64,
        end_ms:     f64,
        label:      String,
        event_type: String,
    },
    /// Quick action from the annotation collaborator: the marker range is
    /// `[now - lookback, now]` against the current playhead time.
    QuickAction {
        event_type:    String,
        label:         String,
        lookback_secs: f64,
    },

    // ── Status ───────────────────────────────────────────────────────────────
    ClearStatus,
}
