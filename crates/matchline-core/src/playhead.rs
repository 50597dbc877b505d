// crates/matchline-core/src/playhead.rs
//
// Playhead: the draggable current-position marker. Drag is an explicit
// Idle|Dragging state machine rather than an ad-hoc flag so the protocol is
// testable without a rendering surface. While Dragging, position updates come
// from the pointer only — decode-engine reports are ignored until release,
// which prevents the marker oscillating between user intent and playback
// feedback.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Playhead {
    position_px: f32,
    state:       DragState,
}

impl Playhead {
    pub fn position_px(&self) -> f32 {
        self.position_px
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Enter Dragging. Only valid from Idle (primary-button-down on the
    /// handle); returns false if a drag was already in flight.
    pub fn begin_drag(&mut self) -> bool {
        if self.state == DragState::Dragging {
            return false;
        }
        self.state = DragState::Dragging;
        true
    }

    /// Pointer-move while Dragging. Clamps to [0, timeline_width] and returns
    /// the stored position. Ignored (returns current position) when Idle.
    pub fn drag_to(&mut self, x: f32, timeline_width: f32) -> f32 {
        if self.state == DragState::Dragging {
            self.position_px = x.clamp(0.0, timeline_width.max(0.0));
        }
        self.position_px
    }

    /// Release → Idle. Returns the final position as the drag-finished event
    /// payload, or None if no drag was in flight.
    pub fn end_drag(&mut self) -> Option<f32> {
        if self.state != DragState::Dragging {
            return None;
        }
        self.state = DragState::Idle;
        Some(self.position_px)
    }

    /// Direct repositioning (seek click, stop, load). Clamped, valid in any
    /// state.
    pub fn set_position(&mut self, x: f32, timeline_width: f32) {
        self.position_px = x.clamp(0.0, timeline_width.max(0.0));
    }

    /// Autonomous repositioning from a decode-engine report. Applied only
    /// while Idle; returns whether the report moved the playhead.
    pub fn apply_report(&mut self, x: f32, timeline_width: f32) -> bool {
        if self.state == DragState::Dragging {
            return false;
        }
        self.position_px = x.clamp(0.0, timeline_width.max(0.0));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_clamps_to_timeline_bounds() {
        let mut ph = Playhead::default();
        assert!(ph.begin_drag());
        assert_eq!(ph.drag_to(-500.0, 1_000.0), 0.0);
        assert_eq!(ph.drag_to(1_500.0, 1_000.0), 1_000.0);
        assert_eq!(ph.end_drag(), Some(1_000.0));
    }

    #[test]
    fn begin_drag_is_rejected_while_dragging() {
        let mut ph = Playhead::default();
        assert!(ph.begin_drag());
        assert!(!ph.begin_drag());
    }

    #[test]
    fn end_drag_without_drag_is_a_noop() {
        let mut ph = Playhead::default();
        assert_eq!(ph.end_drag(), None);
    }

    #[test]
    fn reports_ignored_while_dragging_applied_after() {
        let mut ph = Playhead::default();
        ph.begin_drag();
        ph.drag_to(200.0, 1_000.0);
        assert!(!ph.apply_report(700.0, 1_000.0));
        assert_eq!(ph.position_px(), 200.0);

        ph.end_drag();
        assert!(ph.apply_report(700.0, 1_000.0));
        assert_eq!(ph.position_px(), 700.0);
    }

    #[test]
    fn drag_to_ignored_while_idle() {
        let mut ph = Playhead::default();
        ph.set_position(300.0, 1_000.0);
        assert_eq!(ph.drag_to(900.0, 1_000.0), 300.0);
    }
}
