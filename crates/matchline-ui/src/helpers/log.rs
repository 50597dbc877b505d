// crates/matchline-ui/src/helpers/log.rs
//
// File-backed logging fallback for the UI crate.
//
// Release builds with `windows_subsystem = "windows"` (double-click launch)
// have no console, so `eprintln!` output vanishes. Log calls additionally
// land in %TEMP%/matchline.log, append-only, created on first write.
//
// Usage:
//   use crate::helpers::log::mlog;
//   mlog("[app] source loaded");
//
// Or with format args:
//   matchline_log!("[player] seek to {t:.3}s");

use std::io::Write;

/// Append `msg` to the Matchline log file in the OS temp directory, with a
/// wall-clock prefix. Never panics — a failing fallback path is just dropped.
pub fn mlog(msg: &str) {
    let path = std::env::temp_dir().join("matchline.log");
    let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(path)
    else {
        return;
    };
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let _ = writeln!(file, "{secs} {msg}");
}

/// `eprintln!`-style formatting routed through `mlog`.
#[macro_export]
macro_rules! matchline_log {
    ($($arg:tt)*) => {
        $crate::helpers::log::mlog(&format!($($arg)*))
    };
}
