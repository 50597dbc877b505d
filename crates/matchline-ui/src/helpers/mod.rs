// crates/matchline-ui/src/helpers/mod.rs
//
// Internal helper modules for matchline-ui.

pub mod log;
