// crates/matchline-ui/src/modules/mod.rs
//
// Panel registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing Panel
//   2. Add `pub mod mypanel;` below
//   3. Show it from the matching egui container in app.rs

pub mod player;
pub mod timeline;

use egui::{TextureHandle, Ui};
use matchline_core::commands::TimelineCommand;
use matchline_core::timeline::TimelineState;

/// Every panel implements this trait. Panels read state and emit commands —
/// they never mutate state directly; app.rs processes the commands after the
/// UI pass.
pub trait Panel {
    fn name(&self) -> &str;
    fn ui(
        &mut self,
        ui:    &mut Ui,
        state: &TimelineState,
        frame: Option<&TextureHandle>,
        cmd:   &mut Vec<TimelineCommand>,
    );
}
