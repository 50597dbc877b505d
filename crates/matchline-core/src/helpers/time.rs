// crates/matchline-core/src/helpers/time.rs
//
// Time-formatting utilities shared by the timeline ruler, clip badges and
// the transport readout. All inputs are milliseconds — the unit every clip
// boundary is stored in.

/// Format milliseconds as `MM:SS`.
///
/// Used on clip duration badges and selection labels, where sub-minute
/// precision is enough.
///
/// ```
/// use matchline_core::helpers::time::format_time;
/// assert_eq!(format_time(0.0),       "00:00");
/// assert_eq!(format_time(61_500.0),  "01:01");
/// assert_eq!(format_time(754_000.0), "12:34");
/// ```
pub fn format_time(ms: f64) -> String {
    let secs = (ms / 1000.0).max(0.0);
    let m = (secs / 60.0) as u64;
    let s = (secs % 60.0) as u64;
    format!("{m:02}:{s:02}")
}

/// Format milliseconds as `H:MM:SS`.
///
/// Used on the ruler and the transport readout, where match footage runs
/// past the hour.
///
/// ```
/// use matchline_core::helpers::time::format_time_long;
/// assert_eq!(format_time_long(0.0),         "0:00:00");
/// assert_eq!(format_time_long(61_500.0),    "0:01:01");
/// assert_eq!(format_time_long(3_875_000.0), "1:04:35");
/// ```
pub fn format_time_long(ms: f64) -> String {
    let secs = (ms / 1000.0).max(0.0) as u64;
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_input_clamps_to_zero() {
        assert_eq!(format_time(-5_000.0), "00:00");
        assert_eq!(format_time_long(-1.0), "0:00:00");
    }

    #[test]
    fn minute_rollover() {
        assert_eq!(format_time(59_999.0), "00:59");
        assert_eq!(format_time(60_000.0), "01:00");
    }
}
