// crates/matchline-media/src/lib.rs
//
// The decode/playback engine. No egui dependency — communicates with
// matchline-ui via channels only. One PlayerWorker thread owns the decode
// cursor; the interactive surface owns the control channel.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Route it through a PlayerCommand handled in worker.rs

pub mod decode;
pub mod probe;
pub mod source;
pub mod worker;

/// Initialise FFmpeg. Call once at startup, before the first
/// `PlayerWorker::new()`.
pub fn init() -> anyhow::Result<()> {
    ffmpeg_the_third::init().map_err(Into::into)
}

// Re-export the main public API so matchline-ui imports are simple.
pub use source::{FrameSource, SourceFrame};
pub use worker::PlayerWorker;
pub use matchline_core::media_types::{PlaybackFrame, PlayerCommand, PlayerEvent, PositionReport};
