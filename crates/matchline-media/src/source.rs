// crates/matchline-media/src/source.rs
//
// FrameSource: the seam between the playback loop and the decoder. The loop
// in worker.rs only ever talks to this trait, so its pacing, seeking, peek
// and end-of-stream behaviour are testable with a synthetic source while
// production uses the FFmpeg-backed ClipDecoder.

/// One decoded frame handed across the seam. The buffer is owned — after a
/// source returns it, the source must not retain or mutate it.
pub struct SourceFrame {
    pub data:         Vec<u8>, // RGBA, tightly packed
    pub width:        u32,
    pub height:       u32,
    pub time_secs:    f64,
    pub frame_number: u64,
}

// No Send bound: a source is created, driven and dropped entirely on the
// player thread — only its frames cross the boundary.
pub trait FrameSource {
    /// Source-native frame rate. Drives the playback pacing.
    fn fps(&self) -> f64;

    fn frame_count(&self) -> u64;

    fn duration_secs(&self) -> f64;

    /// Decode the next frame sequentially. None at end of stream.
    fn read_frame(&mut self) -> Option<SourceFrame>;

    /// Reposition the read cursor. Valid whether playing or paused; the next
    /// read_frame delivers from the new position, never a partial frame from
    /// the stale cursor.
    fn seek(&mut self, time_secs: f64);

    /// Step the cursor back one frame, so a read-then-rewind peek is
    /// idempotent.
    fn rewind_frame(&mut self);
}
