// crates/matchline-core/src/timescale.rs
//
// TimeScale: the bidirectional mapping between elapsed seconds and horizontal
// pixel offset, parameterized by zoom (pixels-per-second). The ruler and the
// guide-line grid derive their tick spacing from the same struct so a zoom
// change rescales everything from one source of truth.

use serde::{Deserialize, Serialize};

/// Zoom bounds in pixels-per-second. The slider range 0..=100 maps linearly
/// onto [MIN_PPS, MAX_PPS].
pub const MIN_PPS: f32 = 2.0;
pub const MAX_PPS: f32 = 50.0;

/// Default slider position on startup and on "zoom fit".
pub const DEFAULT_ZOOM_LEVEL: u8 = 30;

/// Headroom past the active clip's end so the playhead never pins to the
/// right edge of the scene while playing out the tail of a clip.
pub const DISPLAY_PADDING: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    pixels_per_second: f32,
    zoom_level:        u8,
    /// Scene duration in seconds — active clip span × DISPLAY_PADDING.
    timeline_duration: f64,
}

impl Default for TimeScale {
    fn default() -> Self {
        let mut ts = Self {
            pixels_per_second: 0.0,
            zoom_level:        DEFAULT_ZOOM_LEVEL,
            timeline_duration: 0.0,
        };
        ts.set_zoom(DEFAULT_ZOOM_LEVEL);
        ts
    }
}

impl TimeScale {
    pub fn pixels_per_second(&self) -> f32 {
        self.pixels_per_second
    }

    pub fn zoom_level(&self) -> u8 {
        self.zoom_level
    }

    pub fn timeline_duration(&self) -> f64 {
        self.timeline_duration
    }

    /// Full scene width in pixels at the current zoom.
    pub fn timeline_width(&self) -> f32 {
        (self.timeline_duration as f32) * self.pixels_per_second
    }

    /// Set zoom from a slider level. Levels outside 0..=100 clamp; the level
    /// maps linearly onto [MIN_PPS, MAX_PPS].
    pub fn set_zoom(&mut self, level: u8) {
        let level = level.min(100);
        self.zoom_level = level;
        self.pixels_per_second =
            MIN_PPS + (level as f32 / 100.0) * (MAX_PPS - MIN_PPS);
    }

    /// Set pixels-per-second directly. Out-of-range values clamp, never
    /// reject. The slider level is back-derived so the UI stays in sync.
    pub fn set_pixels_per_second(&mut self, pps: f32) {
        let pps = pps.clamp(MIN_PPS, MAX_PPS);
        self.pixels_per_second = pps;
        self.zoom_level =
            (((pps - MIN_PPS) / (MAX_PPS - MIN_PPS)) * 100.0).round() as u8;
    }

    /// Recompute the scene duration from the active clip's span (seconds).
    /// Called whenever the active clip changes or a source loads.
    pub fn set_active_span(&mut self, span_secs: f64) {
        self.timeline_duration = (span_secs * DISPLAY_PADDING).max(0.0);
    }

    pub fn time_to_px(&self, secs: f64) -> f32 {
        (secs * self.pixels_per_second as f64) as f32
    }

    pub fn px_to_time(&self, px: f32) -> f64 {
        if self.pixels_per_second <= 0.0 {
            return 0.0;
        }
        px as f64 / self.pixels_per_second as f64
    }

    /// Dashed guide-line spacing in whole seconds, keyed by zoom.
    pub fn guide_interval(&self) -> u32 {
        if self.pixels_per_second >= 20.0 {
            5
        } else if self.pixels_per_second >= 10.0 {
            10
        } else if self.pixels_per_second >= 5.0 {
            20
        } else {
            30
        }
    }

    /// Ruler tick spacing `(major, minor)` in whole seconds, keyed by zoom.
    /// Major ticks carry a time label; minor ticks are short dashes.
    pub fn ruler_intervals(&self) -> (u32, u32) {
        if self.pixels_per_second >= 20.0 {
            (5, 1)
        } else if self.pixels_per_second >= 10.0 {
            (10, 2)
        } else if self.pixels_per_second >= 5.0 {
            (20, 5)
        } else {
            (30, 10)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_level_maps_linearly_onto_pps_range() {
        let mut ts = TimeScale::default();
        ts.set_zoom(0);
        assert_eq!(ts.pixels_per_second(), MIN_PPS);
        ts.set_zoom(100);
        assert_eq!(ts.pixels_per_second(), MAX_PPS);
        ts.set_zoom(50);
        assert!((ts.pixels_per_second() - 26.0).abs() < 1e-5);
    }

    #[test]
    fn zoom_level_above_range_clamps() {
        let mut ts = TimeScale::default();
        ts.set_zoom(200);
        assert_eq!(ts.zoom_level(), 100);
        assert_eq!(ts.pixels_per_second(), MAX_PPS);
    }

    #[test]
    fn direct_pps_clamps_never_rejects() {
        let mut ts = TimeScale::default();
        ts.set_pixels_per_second(0.5);
        assert_eq!(ts.pixels_per_second(), MIN_PPS);
        ts.set_pixels_per_second(500.0);
        assert_eq!(ts.pixels_per_second(), MAX_PPS);
    }

    #[test]
    fn px_time_round_trip_within_one_pixel() {
        let mut ts = TimeScale::default();
        ts.set_active_span(600.0);
        for level in [0u8, 13, 30, 68, 100] {
            ts.set_zoom(level);
            let width = ts.timeline_width();
            let mut x = 0.0f32;
            while x <= width {
                let back = ts.time_to_px(ts.px_to_time(x));
                assert!(
                    (back - x).abs() <= 1.0,
                    "round trip drifted at x={x} level={level}: {back}"
                );
                x += width / 64.0 + 1.0;
            }
        }
    }

    #[test]
    fn mapping_is_monotonic() {
        let ts = TimeScale::default();
        let mut prev = f32::NEG_INFINITY;
        for s in 0..120 {
            let px = ts.time_to_px(s as f64);
            assert!(px > prev);
            prev = px;
        }
    }

    #[test]
    fn guide_interval_follows_zoom_thresholds() {
        let mut ts = TimeScale::default();
        ts.set_pixels_per_second(25.0);
        assert_eq!(ts.guide_interval(), 5);
        ts.set_pixels_per_second(12.0);
        assert_eq!(ts.guide_interval(), 10);
        ts.set_pixels_per_second(6.0);
        assert_eq!(ts.guide_interval(), 20);
        ts.set_pixels_per_second(2.0);
        assert_eq!(ts.guide_interval(), 30);
    }

    #[test]
    fn active_span_applies_display_padding() {
        let mut ts = TimeScale::default();
        ts.set_active_span(100.0);
        assert!((ts.timeline_duration() - 120.0).abs() < 1e-9);
    }
}
