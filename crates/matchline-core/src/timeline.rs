// crates/matchline-core/src/timeline.rs
//
// TimelineState: controller-owned timeline data. Owns the clip arena, the
// single playhead, the time scale, markers and the cut-mode flag. All
// structural mutation (add/remove/split/reorganize) happens here, on the
// interactive surface's thread; the decode engine only ever talks to this
// struct through position reports.
//
// Invariants maintained by this module:
//   · at most one clip is active at a time
//   · clip layout is contiguous left-to-right with zero gap after reorganize
//   · a clip with an in-flight selection drag cannot be structurally edited

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::autoscroll::AutoScroll;
use crate::clip::{Clip, SelectionRange};
use crate::events::{EventCatalogue, Marker, TimelineEvent};
use crate::helpers::time::format_time;
use crate::media_types::PositionReport;
use crate::playhead::Playhead;
use crate::timescale::{TimeScale, DEFAULT_ZOOM_LEVEL};

/// Zoom step for the in/out buttons, in slider levels.
const ZOOM_STEP: u8 = 10;

/// Metadata of the currently loaded source, filled from the probe that runs
/// on load.
#[derive(Clone, Debug)]
pub struct LoadedSource {
    pub id:          Uuid,
    pub path:        PathBuf,
    pub name:        String,
    pub duration_ms: f64,
    pub fps:         f64,
    pub frame_count: u64,
}

/// One clip as exposed to the project-persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipRecord {
    pub source_id:  Uuid,
    pub start_trim: f64,
    pub end_trim:   f64,
    pub position:   f32,
}

/// The serializable view handed to (and accepted from) the persistence
/// collaborator. Everything else in TimelineState is runtime-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub clips:              Vec<ClipRecord>,
    pub playhead_time_secs: f64,
}

impl ProjectSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

pub struct TimelineState {
    pub clips:     Vec<Clip>,
    pub markers:   Vec<Marker>,
    pub playhead:  Playhead,
    pub scale:     TimeScale,
    pub catalogue: EventCatalogue,
    pub autoscroll: AutoScroll,

    pub cut_mode:   bool,
    pub is_playing: bool,
    pub speed:      f64,
    /// True while the last input was keyboard navigation — selects the
    /// paging auto-scroll policy.
    pub keyboard_nav: bool,

    pub source: Option<LoadedSource>,

    /// Last decode report, mirrored for readouts.
    pub current_time:  f64,
    pub current_frame: u64,

    /// Transient status text for the toolbar (decode failures, split
    /// confirmations). Cleared by ClearStatus after a short interval.
    pub status: Option<String>,

    /// Outbound notifications, drained by the app once per frame.
    events: Vec<TimelineEvent>,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            clips:         Vec::new(),
            markers:       Vec::new(),
            playhead:      Playhead::default(),
            scale:         TimeScale::default(),
            catalogue:     EventCatalogue::builtin(),
            autoscroll:    AutoScroll::default(),
            cut_mode:      false,
            is_playing:    false,
            speed:         1.0,
            keyboard_nav:  false,
            source:        None,
            current_time:  0.0,
            current_frame: 0,
            status:        None,
            events:        Vec::new(),
        }
    }
}

impl TimelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn timeline_width(&self) -> f32 {
        self.scale.timeline_width()
    }

    // ── Clip lookup ──────────────────────────────────────────────────────────

    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn clip_mut(&mut self, id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    pub fn active_clip(&self) -> Option<&Clip> {
        self.clips.iter().find(|c| c.is_active)
    }

    /// The clip under scene pixel `x`, with the local offset into it.
    pub fn clip_at_scene_x(&self, x: f32) -> Option<(Uuid, f32)> {
        self.clips
            .iter()
            .find(|c| x >= c.position_px && x < c.position_px + c.width_px())
            .map(|c| (c.id, x - c.position_px))
    }

    // ── Source lifecycle ─────────────────────────────────────────────────────

    /// A source finished loading: rebuild the timeline with one full-span
    /// clip, reset the decode-session mirror and park the playhead at 0.
    pub fn load_source(&mut self, source: LoadedSource) {
        self.clips.clear();
        self.markers.clear();
        self.is_playing = false;
        self.speed = 1.0;
        self.current_time = 0.0;
        self.current_frame = 0;

        let clip = Clip::new(
            source.id,
            source.name.clone(),
            source.duration_ms,
            self.scale.pixels_per_second(),
            0.0,
            None,
        );
        let id = self.add_clip(clip);
        self.set_active(id);

        self.playhead.set_position(0.0, self.timeline_width());
        self.status = Some(format!("Loaded {}", source.name));
        self.source = Some(source);
    }

    // ── Layout ───────────────────────────────────────────────────────────────

    /// Re-derive clip positions left-to-right with zero gap, preserving the
    /// current left-to-right order.
    pub fn reorganize(&mut self) {
        self.clips
            .sort_by(|a, b| a.position_px.total_cmp(&b.position_px));
        let mut x = 0.0f32;
        for clip in &mut self.clips {
            clip.position_px = x;
            x += clip.width_px();
        }
    }

    /// Append a clip after the last one and reflow.
    pub fn add_clip(&mut self, mut clip: Clip) -> Uuid {
        let next_x = self
            .clips
            .iter()
            .map(|c| c.position_px + c.width_px())
            .fold(0.0f32, f32::max);
        clip.position_px = next_x;
        let id = clip.id;
        self.clips.push(clip);
        self.reorganize();
        self.events.push(TimelineEvent::StructureChanged);
        id
    }

    /// Remove a clip and its markers. Refused while the clip has a selection
    /// drag in flight.
    pub fn remove_clip(&mut self, id: Uuid) -> bool {
        let Some(clip) = self.clip(id) else { return false };
        if clip.selection_in_progress() {
            self.status = Some("Finish the selection first".into());
            return false;
        }
        let was_active = clip.is_active;
        self.clips.retain(|c| c.id != id);
        self.markers.retain(|m| m.clip_id != id);
        self.reorganize();
        if was_active {
            if let Some(first) = self.clips.first().map(|c| c.id) {
                self.set_active(first);
            }
        }
        self.events.push(TimelineEvent::StructureChanged);
        true
    }

    /// Make `id` the single active clip and re-derive the scene duration
    /// from its span.
    pub fn set_active(&mut self, id: Uuid) {
        let mut span_secs = None;
        for clip in &mut self.clips {
            let active = clip.id == id;
            clip.set_active(active);
            if active {
                span_secs = Some(clip.actual_duration_ms() / 1000.0);
            }
        }
        if let Some(span) = span_secs {
            self.scale.set_active_span(span);
        }
    }

    // ── Zoom ─────────────────────────────────────────────────────────────────

    /// Zoom change, applied atomically: new pixels-per-second, every clip
    /// rescaled (time-domain boundaries untouched), layout reflowed with
    /// zero gap, playhead re-projected so it stays on the same instant.
    pub fn set_zoom_level(&mut self, level: u8) {
        let t = self.playhead_time_secs();
        self.scale.set_zoom(level);
        let pps = self.scale.pixels_per_second();
        for clip in &mut self.clips {
            clip.resize_for_zoom(pps);
        }
        self.reorganize();
        self.playhead
            .set_position(self.scale.time_to_px(t), self.timeline_width());
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom_level(self.scale.zoom_level().saturating_add(ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom_level(self.scale.zoom_level().saturating_sub(ZOOM_STEP));
    }

    pub fn zoom_fit(&mut self) {
        self.set_zoom_level(DEFAULT_ZOOM_LEVEL);
    }

    // ── Split ────────────────────────────────────────────────────────────────

    /// Split a clip at a local pixel offset: the original is removed and two
    /// children take its place. Out-of-bounds split points are silently
    /// rejected; a clip with a selection drag in flight refuses the edit.
    /// Markers remap to the child containing their start time.
    pub fn split_clip_at(&mut self, clip_id: Uuid, local_x: f32) -> bool {
        let Some(idx) = self.clips.iter().position(|c| c.id == clip_id) else {
            return false;
        };
        if self.clips[idx].selection_in_progress() {
            self.status = Some("Finish the selection first".into());
            return false;
        }
        let Some(split_ms) = self.clips[idx].split_time_at(local_x) else {
            return false; // pointer drift near an edge — not an error
        };

        let original = self.clips.remove(idx);
        let (mut left, right) = original.split_children(split_ms);
        let (left_id, right_id) = (left.id, right.id);
        left.set_active(original.is_active);
        self.clips.insert(idx, right);
        self.clips.insert(idx, left);

        for marker in &mut self.markers {
            if marker.clip_id == original.id {
                marker.clip_id = if marker.start_ms < split_ms {
                    left_id
                } else {
                    right_id
                };
            }
        }
        // A marker can only fall outside both children if its clip reference
        // was already stale — drop those rather than leave them dangling.
        let (ls, le) = (original.start_trim, split_ms);
        let (rs, re) = (split_ms, original.end_trim);
        self.markers.retain(|m| {
            if m.clip_id == left_id {
                m.start_ms >= ls && m.start_ms < le
            } else if m.clip_id == right_id {
                m.start_ms >= rs && m.start_ms <= re
            } else {
                true
            }
        });

        self.reorganize();
        if let Some(active) = self.clips.iter().find(|c| c.is_active).map(|c| c.id) {
            self.set_active(active);
        }
        self.status = Some(format!("Split at {}", format_time(split_ms)));
        self.events.push(TimelineEvent::StructureChanged);
        true
    }

    // ── Playhead & decode sync ───────────────────────────────────────────────

    pub fn playhead_time_secs(&self) -> f64 {
        self.scale.px_to_time(self.playhead.position_px())
    }

    pub fn set_playhead_time(&mut self, secs: f64) {
        self.playhead
            .set_position(self.scale.time_to_px(secs), self.timeline_width());
    }

    /// A position report from the decode engine. The readout mirror always
    /// updates; the playhead moves only when no drag is in flight.
    pub fn apply_position_report(&mut self, report: PositionReport) -> bool {
        self.current_time = report.time_secs;
        self.current_frame = report.frame_number;
        self.playhead.apply_report(
            self.scale.time_to_px(report.time_secs),
            self.timeline_width(),
        )
    }

    // ── Selection ────────────────────────────────────────────────────────────

    pub fn begin_selection(&mut self, clip_id: Uuid, local_x: f32) {
        if let Some(clip) = self.clip_mut(clip_id) {
            clip.begin_selection(local_x);
        }
    }

    pub fn update_selection(&mut self, clip_id: Uuid, local_x: f32) {
        if let Some(clip) = self.clip_mut(clip_id) {
            clip.update_selection(local_x);
        }
    }

    /// Finish a selection drag. Commits emit SelectionCommitted for the
    /// annotation collaborator; sub-threshold drags vanish silently.
    pub fn end_selection(&mut self, clip_id: Uuid) -> Option<SelectionRange> {
        let range = self.clip_mut(clip_id)?.end_selection();
        if let Some(range) = range {
            self.events.push(TimelineEvent::SelectionCommitted {
                clip_id,
                start_ms: range.start_ms,
                end_ms:   range.end_ms,
            });
            self.status = Some(format!(
                "Selected {} – {}",
                format_time(range.start_ms),
                format_time(range.end_ms),
            ));
        }
        range
    }

    pub fn set_selection_range(&mut self, clip_id: Uuid, start_ms: f64, end_ms: f64) {
        if let Some(clip) = self.clip_mut(clip_id) {
            clip.set_selection_range(start_ms, end_ms);
        }
    }

    pub fn clear_selection(&mut self, clip_id: Uuid) {
        if let Some(clip) = self.clip_mut(clip_id) {
            clip.clear_selection();
        }
    }

    // ── Markers ──────────────────────────────────────────────────────────────

    /// Attach a marker to the active clip, clamped to its trim range.
    /// Returns None (with a status note) when nothing is active.
    pub fn attach_marker(
        &mut self,
        start_ms:   f64,
        end_ms:     f64,
        label:      impl Into<String>,
        event_type: impl Into<String>,
    ) -> Option<Uuid> {
        let Some(clip) = self.active_clip() else {
            self.status = Some("No active clip for the marker".into());
            return None;
        };
        let a = start_ms.clamp(clip.start_trim, clip.end_trim);
        let b = end_ms.clamp(clip.start_trim, clip.end_trim);
        let (start_ms, end_ms) = if a <= b { (a, b) } else { (b, a) };
        let marker = Marker {
            id: Uuid::new_v4(),
            clip_id: clip.id,
            start_ms,
            end_ms,
            label: label.into(),
            event_type: event_type.into(),
        };
        let id = marker.id;
        self.events
            .push(TimelineEvent::MarkerAttached { marker: marker.clone() });
        self.markers.push(marker);
        Some(id)
    }

    /// Quick action: the annotation collaborator sends an event type with a
    /// lookback duration; the marker covers the window that just happened.
    pub fn quick_action(
        &mut self,
        event_type:    impl Into<String>,
        label:         impl Into<String>,
        lookback_secs: f64,
    ) -> Option<Uuid> {
        let end_ms = self.current_time * 1000.0;
        let start_ms = (end_ms - lookback_secs * 1000.0).max(0.0);
        self.attach_marker(start_ms, end_ms, label, event_type)
    }

    // ── Persistence surface ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            clips: self
                .clips
                .iter()
                .map(|c| ClipRecord {
                    source_id:  c.source_id,
                    start_trim: c.start_trim,
                    end_trim:   c.end_trim,
                    position:   c.position_px,
                })
                .collect(),
            playhead_time_secs: self.playhead_time_secs(),
        }
    }

    /// Rebuild clips from a snapshot against the currently loaded source.
    /// Records for other sources are skipped; clips come back in source
    /// order and the layout is re-derived by reorganize.
    pub fn restore(&mut self, snapshot: &ProjectSnapshot) {
        let Some(source) = self.source.clone() else { return };
        self.clips.clear();
        self.markers.clear();
        let pps = self.scale.pixels_per_second();
        for record in snapshot
            .clips
            .iter()
            .filter(|r| r.source_id == source.id)
        {
            let mut clip = Clip::new(
                source.id,
                source.name.clone(),
                source.duration_ms,
                pps,
                record.start_trim,
                Some(record.end_trim),
            );
            clip.position_px = record.position;
            self.clips.push(clip);
        }
        self.reorganize();
        if let Some(first) = self.clips.first().map(|c| c.id) {
            self.set_active(first);
        }
        self.set_playhead_time(snapshot.playhead_time_secs);
        self.events.push(TimelineEvent::StructureChanged);
    }

    // ── Events out ───────────────────────────────────────────────────────────

    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_state() -> TimelineState {
        let mut state = TimelineState::new();
        state.load_source(LoadedSource {
            id:          Uuid::new_v4(),
            path:        PathBuf::from("match.mp4"),
            name:        "match.mp4".into(),
            duration_ms: 10_000.0,
            fps:         30.0,
            frame_count: 300,
        });
        state
    }

    #[test]
    fn load_builds_one_active_full_span_clip() {
        let state = loaded_state();
        assert_eq!(state.clips.len(), 1);
        let clip = &state.clips[0];
        assert!(clip.is_active);
        assert_eq!((clip.start_trim, clip.end_trim), (0.0, 10_000.0));
        assert_eq!(clip.position_px, 0.0);
        // Scene duration carries the display padding.
        assert!((state.scale.timeline_duration() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn split_replaces_one_clip_with_two_contiguous_children() {
        let mut state = loaded_state();
        let id = state.clips[0].id;
        let split_x = state.clips[0].local_px(4_000.0);
        assert!(state.split_clip_at(id, split_x));

        assert_eq!(state.clips.len(), 2);
        let (l, r) = (&state.clips[0], &state.clips[1]);
        assert!((l.end_trim - 4_000.0).abs() < 1.0);
        assert!((r.start_trim - 4_000.0).abs() < 1.0);
        assert_eq!(r.end_trim, 10_000.0);
        // Zero-gap layout.
        assert_eq!(l.position_px, 0.0);
        assert!((r.position_px - l.width_px()).abs() < 0.01);
        // Active clip carried to the left child, exactly one active.
        assert_eq!(state.clips.iter().filter(|c| c.is_active).count(), 1);
        assert!(l.is_active);
    }

    #[test]
    fn split_at_clip_edges_is_a_noop() {
        let mut state = loaded_state();
        let id = state.clips[0].id;
        let width = state.clips[0].width_px();
        assert!(!state.split_clip_at(id, 0.0));
        assert!(!state.split_clip_at(id, width));
        assert_eq!(state.clips.len(), 1);
    }

    #[test]
    fn split_is_blocked_while_that_clip_has_a_selection_drag() {
        let mut state = loaded_state();
        let id = state.clips[0].id;
        state.begin_selection(id, 10.0);
        assert!(!state.split_clip_at(id, 30.0));
        assert_eq!(state.clips.len(), 1);
        // Finishing the drag unblocks the edit.
        state.update_selection(id, 40.0);
        state.end_selection(id);
        assert!(state.split_clip_at(id, 30.0));
        assert_eq!(state.clips.len(), 2);
    }

    #[test]
    fn split_remaps_markers_to_the_containing_child() {
        let mut state = loaded_state();
        let parent = state.clips[0].id;
        state.attach_marker(1_000.0, 2_000.0, "early", "counter");
        state.attach_marker(6_000.0, 7_000.0, "late", "goal");
        let split_x = state.clips[0].local_px(4_000.0);
        assert!(state.split_clip_at(parent, split_x));

        let (left_id, right_id) = (state.clips[0].id, state.clips[1].id);
        let early = state.markers.iter().find(|m| m.label == "early").unwrap();
        let late = state.markers.iter().find(|m| m.label == "late").unwrap();
        assert_eq!(early.clip_id, left_id);
        assert_eq!(late.clip_id, right_id);
    }

    #[test]
    fn selection_commit_flows_through_controller_events() {
        let mut state = loaded_state();
        let id = state.clips[0].id;
        let pps = state.scale.pixels_per_second();

        // 80ms of drag — discarded, no event.
        state.begin_selection(id, 10.0);
        state.update_selection(id, 10.0 + 0.080 * pps);
        assert!(state.end_selection(id).is_none());
        assert!(state
            .drain_events()
            .iter()
            .all(|e| !matches!(e, TimelineEvent::SelectionCommitted { .. })));

        // 120ms — commits and notifies.
        state.begin_selection(id, 10.0);
        state.update_selection(id, 10.0 + 0.120 * pps);
        assert!(state.end_selection(id).is_some());
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, TimelineEvent::SelectionCommitted { .. })));
    }

    #[test]
    fn position_reports_respect_playhead_drag() {
        let mut state = loaded_state();
        let report = PositionReport { time_secs: 5.0, frame_number: 150 };

        state.playhead.begin_drag();
        assert!(!state.apply_position_report(report));
        // Readout mirror still updates while the playhead holds.
        assert_eq!(state.current_frame, 150);

        state.playhead.end_drag();
        assert!(state.apply_position_report(report));
        assert!((state.playhead_time_secs() - 5.0).abs() < 0.01);
    }

    #[test]
    fn zoom_rescales_projections_and_preserves_playhead_time() {
        let mut state = loaded_state();
        let id = state.clips[0].id;
        state.split_clip_at(id, state.clips[0].local_px(4_000.0));
        state.set_playhead_time(6.0);

        let trims: Vec<_> = state
            .clips
            .iter()
            .map(|c| (c.start_trim, c.end_trim))
            .collect();
        for level in [0u8, 100, 42] {
            state.set_zoom_level(level);
            let now: Vec<_> = state
                .clips
                .iter()
                .map(|c| (c.start_trim, c.end_trim))
                .collect();
            assert_eq!(now, trims);
            assert!((state.playhead_time_secs() - 6.0).abs() < 0.01);
            // Layout stays contiguous at every zoom.
            let mut x = 0.0f32;
            for c in &state.clips {
                assert!((c.position_px - x).abs() < 0.01);
                x += c.width_px();
            }
        }
    }

    #[test]
    fn remove_clip_reflows_and_reassigns_active() {
        let mut state = loaded_state();
        let id = state.clips[0].id;
        state.split_clip_at(id, state.clips[0].local_px(4_000.0));
        let left = state.clips[0].id;
        assert!(state.remove_clip(left));
        assert_eq!(state.clips.len(), 1);
        assert_eq!(state.clips[0].position_px, 0.0);
        assert!(state.clips[0].is_active);
    }

    #[test]
    fn snapshot_restore_round_trips_clip_records() {
        let mut state = loaded_state();
        let id = state.clips[0].id;
        state.split_clip_at(id, state.clips[0].local_px(4_000.0));
        state.set_playhead_time(3.5);

        let snap = state.snapshot();
        assert_eq!(snap.clips.len(), 2);

        state.restore(&snap);
        assert_eq!(state.snapshot().clips, snap.clips);
        assert!((state.playhead_time_secs() - 3.5).abs() < 0.01);
    }

    #[test]
    fn snapshot_survives_json_round_trip() {
        let state = loaded_state();
        let snap = state.snapshot();
        let json = snap.to_json().unwrap();
        assert_eq!(ProjectSnapshot::from_json(&json).unwrap(), snap);
    }

    #[test]
    fn marker_requires_an_active_clip() {
        let mut state = TimelineState::new();
        assert!(state.attach_marker(0.0, 1_000.0, "x", "goal").is_none());

        let mut state = loaded_state();
        let id = state
            .attach_marker(-500.0, 99_000.0, "clamped", "goal")
            .unwrap();
        let marker = state.markers.iter().find(|m| m.id == id).unwrap();
        assert_eq!(marker.start_ms, 0.0);
        assert_eq!(marker.end_ms, 10_000.0);
    }

    #[test]
    fn quick_action_marks_the_lookback_window() {
        let mut state = loaded_state();
        state.apply_position_report(PositionReport {
            time_secs:    8.0,
            frame_number: 240,
        });
        state.quick_action("counter", "Counter", 5.0).unwrap();
        let marker = state.markers.last().unwrap();
        assert!((marker.start_ms - 3_000.0).abs() < 1.0);
        assert!((marker.end_ms - 8_000.0).abs() < 1.0);
    }
}
