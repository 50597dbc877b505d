// crates/matchline-core/src/clip.rs
//
// Clip: a positioned, trimmed representation of one video source on the
// timeline. Owns its trim boundaries, the pointer-driven partial-selection
// protocol, and the split computation. Pixel projections are derived from the
// cached pixels-per-second; the time-domain fields (trims, selection) never
// change under zoom.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Committed selections shorter than this are treated as mis-clicks and
/// discarded. Strictly-greater spans commit.
pub const SELECTION_MIN_MS: f64 = 100.0;

/// A committed sub-range of a clip, in source milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start_ms: f64,
    pub end_ms:   f64,
}

impl SelectionRange {
    pub fn duration_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }
}

/// In-flight pointer selection. Anchor is where the drag began; head follows
/// the pointer. Both are local pixel offsets into the clip. Runtime-only —
/// a drag never survives a save.
#[derive(Clone, Copy, Debug)]
pub struct SelectionDrag {
    pub anchor_x: f32,
    pub head_x:   f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Clip {
    pub id:        Uuid,
    pub source_id: Uuid,
    pub source_name: String,
    /// Full source duration, ms. Immutable for the clip's lifetime.
    pub original_duration_ms: f64,
    /// Visible sub-range of the source, ms. 0 ≤ start < end ≤ original.
    pub start_trim: f64,
    pub end_trim:   f64,
    /// Scene-space left edge, px. Assigned by TimelineState::reorganize.
    pub position_px: f32,
    /// Cached zoom, explicitly synced on zoom change via resize_for_zoom.
    pub pixels_per_second: f32,
    #[serde(default)]
    pub selection: Option<SelectionRange>,
    /// Exactly one clip is active at a time — enforced by TimelineState.
    #[serde(default)]
    pub is_active: bool,
    #[serde(skip)]
    drag: Option<SelectionDrag>,
}

impl Clip {
    pub fn new(
        source_id:   Uuid,
        source_name: impl Into<String>,
        original_duration_ms: f64,
        pixels_per_second:    f32,
        start_trim: f64,
        end_trim:   Option<f64>,
    ) -> Self {
        let end_trim = end_trim.unwrap_or(original_duration_ms);
        Self {
            id: Uuid::new_v4(),
            source_id,
            source_name: source_name.into(),
            original_duration_ms,
            start_trim,
            end_trim,
            position_px: 0.0,
            pixels_per_second,
            selection: None,
            is_active: false,
            drag: None,
        }
    }

    pub fn actual_duration_ms(&self) -> f64 {
        self.end_trim - self.start_trim
    }

    pub fn width_px(&self) -> f32 {
        (self.actual_duration_ms() / 1000.0) as f32 * self.pixels_per_second
    }

    pub fn is_trimmed(&self) -> bool {
        self.start_trim > 0.0 || self.end_trim < self.original_duration_ms
    }

    /// Rescale pixel projections for a new zoom. Width and handle positions
    /// are derived from pixels_per_second, so storing the new factor is the
    /// whole operation — trims and selection stay in the time domain.
    pub fn resize_for_zoom(&mut self, new_pps: f32) {
        self.pixels_per_second = new_pps;
    }

    /// Right-edge handle offset, px. Tracks the new right edge after zoom.
    pub fn handle_px(&self) -> f32 {
        self.width_px()
    }

    // ── Local time↔pixel conversion ──────────────────────────────────────────
    // Distinct from the scene-global mapping: these are offsets into the clip
    // rectangle, in source milliseconds.

    /// Local pixel offset → source time in ms (start_trim at x=0).
    pub fn local_time(&self, x: f32) -> f64 {
        let width = self.width_px();
        if width <= 0.0 {
            return self.start_trim;
        }
        let ratio = (x / width) as f64;
        self.start_trim + ratio * self.actual_duration_ms()
    }

    /// Source time in ms → local pixel offset.
    pub fn local_px(&self, time_ms: f64) -> f32 {
        let dur = self.actual_duration_ms();
        if dur <= 0.0 {
            return 0.0;
        }
        (((time_ms - self.start_trim) / dur) as f32) * self.width_px()
    }

    // ── Partial selection ────────────────────────────────────────────────────

    pub fn begin_selection(&mut self, local_x: f32) {
        let x = local_x.clamp(0.0, self.width_px());
        self.drag = Some(SelectionDrag { anchor_x: x, head_x: x });
    }

    pub fn update_selection(&mut self, local_x: f32) {
        let width = self.width_px();
        if let Some(drag) = &mut self.drag {
            drag.head_x = local_x.clamp(0.0, width);
        }
    }

    /// Finish the drag. Commits and returns the range when its span exceeds
    /// SELECTION_MIN_MS, normalized so start ≤ end regardless of drag
    /// direction; shorter spans are discarded as mis-clicks.
    pub fn end_selection(&mut self) -> Option<SelectionRange> {
        let drag = self.drag.take()?;
        let a = self.local_time(drag.anchor_x);
        let b = self.local_time(drag.head_x);
        let (start_ms, end_ms) = if a <= b { (a, b) } else { (b, a) };
        if end_ms - start_ms > SELECTION_MIN_MS {
            let range = SelectionRange { start_ms, end_ms };
            self.selection = Some(range);
            Some(range)
        } else {
            self.selection = None;
            None
        }
    }

    pub fn selection_in_progress(&self) -> bool {
        self.drag.is_some()
    }

    /// Live drag extent as a normalized local pixel range, for rendering.
    pub fn drag_extent(&self) -> Option<(f32, f32)> {
        self.drag.map(|d| {
            if d.anchor_x <= d.head_x {
                (d.anchor_x, d.head_x)
            } else {
                (d.head_x, d.anchor_x)
            }
        })
    }

    /// Programmatic selection. Endpoints clamp to the trim range and swap if
    /// reversed; a clamped span at or under the mis-click threshold clears
    /// the selection instead of storing a degenerate range.
    pub fn set_selection_range(&mut self, start_ms: f64, end_ms: f64) {
        let a = start_ms.clamp(self.start_trim, self.end_trim);
        let b = end_ms.clamp(self.start_trim, self.end_trim);
        let (start_ms, end_ms) = if a <= b { (a, b) } else { (b, a) };
        if end_ms - start_ms > SELECTION_MIN_MS {
            self.selection = Some(SelectionRange { start_ms, end_ms });
        } else {
            self.selection = None;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.drag = None;
    }

    // ── Split ────────────────────────────────────────────────────────────────

    /// Source time at `local_x` if it is a valid split point — strictly
    /// inside the trim range. Pointer drift onto an edge returns None.
    pub fn split_time_at(&self, local_x: f32) -> Option<f64> {
        let t = self.local_time(local_x);
        if t > self.start_trim && t < self.end_trim {
            Some(t)
        } else {
            None
        }
    }

    /// Build the two replacement clips for a split at `split_ms`. The caller
    /// (TimelineState) removes `self` and inserts both. Children inherit
    /// source, original duration and zoom; each inherits the parent's
    /// selection only if that selection lies entirely within its own range —
    /// a selection straddling the split no longer describes a single clip's
    /// sub-range and is dropped.
    pub fn split_children(&self, split_ms: f64) -> (Clip, Clip) {
        let mut left = Clip::new(
            self.source_id,
            self.source_name.clone(),
            self.original_duration_ms,
            self.pixels_per_second,
            self.start_trim,
            Some(split_ms),
        );
        let mut right = Clip::new(
            self.source_id,
            self.source_name.clone(),
            self.original_duration_ms,
            self.pixels_per_second,
            split_ms,
            Some(self.end_trim),
        );
        left.position_px = self.position_px;
        right.position_px = self.position_px + left.width_px();
        if let Some(sel) = self.selection {
            if sel.end_ms <= split_ms {
                left.selection = Some(sel);
            } else if sel.start_ms >= split_ms {
                right.selection = Some(sel);
            }
        }
        (left, right)
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(start_trim: f64, end_trim: f64) -> Clip {
        Clip::new(
            Uuid::new_v4(),
            "match.mp4",
            10_000.0,
            10.0,
            start_trim,
            Some(end_trim),
        )
    }

    #[test]
    fn width_follows_trimmed_duration_and_zoom() {
        let c = clip(0.0, 10_000.0);
        assert_eq!(c.width_px(), 100.0); // 10s × 10 px/s
        let c = clip(2_000.0, 7_000.0);
        assert_eq!(c.width_px(), 50.0);
    }

    #[test]
    fn local_conversion_round_trips() {
        let c = clip(2_000.0, 8_000.0);
        for x in [0.0f32, 10.0, 33.3, 60.0] {
            let t = c.local_time(x);
            assert!((c.local_px(t) - x).abs() < 0.01);
        }
        assert_eq!(c.local_time(0.0), 2_000.0);
        assert_eq!(c.local_time(c.width_px()), 8_000.0);
    }

    #[test]
    fn zoom_changes_projection_not_trims_or_selection() {
        let mut c = clip(1_000.0, 9_000.0);
        c.set_selection_range(2_000.0, 4_000.0);
        let before = (c.start_trim, c.end_trim, c.selection);
        for pps in [2.0f32, 50.0, 7.5, 26.0, 2.0] {
            c.resize_for_zoom(pps);
            assert_eq!((c.start_trim, c.end_trim, c.selection), before);
            assert_eq!(c.handle_px(), c.width_px());
        }
    }

    #[test]
    fn selection_under_threshold_discards() {
        let mut c = clip(0.0, 10_000.0);
        // 80ms at 10 px/s is 0.8px of drag.
        c.begin_selection(10.0);
        c.update_selection(10.8);
        assert!(c.end_selection().is_none());
        assert!(c.selection.is_none());
    }

    #[test]
    fn selection_over_threshold_commits() {
        let mut c = clip(0.0, 10_000.0);
        // 120ms at 10 px/s is 1.2px of drag.
        c.begin_selection(10.0);
        c.update_selection(11.2);
        let sel = c.end_selection().expect("120ms commits");
        assert!((sel.duration_ms() - 120.0).abs() < 1.0);
    }

    #[test]
    fn selection_normalizes_drag_direction() {
        let mut c = clip(0.0, 10_000.0);
        c.begin_selection(50.0);
        c.update_selection(20.0);
        let sel = c.end_selection().unwrap();
        assert!(sel.start_ms < sel.end_ms);
        assert!((sel.start_ms - 2_000.0).abs() < 1.0);
        assert!((sel.end_ms - 5_000.0).abs() < 1.0);
    }

    #[test]
    fn selection_drag_clamps_to_clip_bounds() {
        let mut c = clip(0.0, 10_000.0);
        c.begin_selection(-40.0);
        c.update_selection(9_999.0);
        let sel = c.end_selection().unwrap();
        assert_eq!(sel.start_ms, 0.0);
        assert_eq!(sel.end_ms, 10_000.0);
    }

    #[test]
    fn programmatic_selection_clamps_to_trims() {
        let mut c = clip(2_000.0, 8_000.0);
        c.set_selection_range(0.0, 20_000.0);
        let sel = c.selection.unwrap();
        assert_eq!(sel.start_ms, 2_000.0);
        assert_eq!(sel.end_ms, 8_000.0);
    }

    #[test]
    fn split_inside_range_yields_adjacent_children() {
        let c = clip(0.0, 10_000.0);
        let split = c.split_time_at(40.0).expect("4000ms is splittable");
        assert!((split - 4_000.0).abs() < 1.0);
        let (l, r) = c.split_children(split);
        assert_eq!((l.start_trim, l.end_trim), (0.0, split));
        assert_eq!((r.start_trim, r.end_trim), (split, 10_000.0));
        assert_eq!(l.source_id, c.source_id);
        assert_eq!(r.original_duration_ms, c.original_duration_ms);
        assert_eq!(r.pixels_per_second, c.pixels_per_second);
    }

    #[test]
    fn split_at_edges_is_rejected() {
        let c = clip(0.0, 10_000.0);
        assert!(c.split_time_at(0.0).is_none());
        assert!(c.split_time_at(c.width_px()).is_none());
        assert!(c.split_time_at(-5.0).is_none());
    }

    #[test]
    fn split_remaps_contained_selection_and_drops_straddling() {
        let mut c = clip(0.0, 10_000.0);
        c.set_selection_range(1_000.0, 3_000.0);
        let (l, r) = c.split_children(4_000.0);
        assert_eq!(l.selection, c.selection);
        assert!(r.selection.is_none());

        c.set_selection_range(3_000.0, 6_000.0);
        let (l, r) = c.split_children(4_000.0);
        assert!(l.selection.is_none());
        assert!(r.selection.is_none());
    }
}
