// crates/matchline-core/src/lib.rs
//
// Pure timeline data and math — no egui, no ffmpeg, no runtime handles.
// Everything here is deterministic and testable without a rendering surface
// or a decode thread. Used by both matchline-ui and matchline-media.
//
// To add a new timeline capability:
//   1. Create a new module file here
//   2. Add `pub mod mymodule;` below
//   3. Route the user action through a TimelineCommand variant

pub mod autoscroll;
pub mod clip;
pub mod commands;
pub mod events;
pub mod helpers;
pub mod media_types;
pub mod playhead;
pub mod timeline;
pub mod timescale;

// Re-export the types that nearly every consumer needs so imports stay short.
pub use clip::{Clip, SelectionRange};
pub use commands::TimelineCommand;
pub use playhead::Playhead;
pub use timeline::TimelineState;
pub use timescale::TimeScale;
