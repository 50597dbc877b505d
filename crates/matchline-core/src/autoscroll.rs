// crates/matchline-core/src/autoscroll.rs
//
// Auto-scroll: keeps the playhead visible by repositioning the viewport.
// Three mutually exclusive policies pick a target center; the target then
// hands off to a bounded-duration eased interpolation instead of an instant
// jump (unless smoothing is disabled).

/// Pixel margin from each viewport edge for the follow and paging policies.
pub const SCROLL_MARGIN: f32 = 30.0;

/// Smooth-scroll animation length, seconds.
pub const SCROLL_ANIM_SECS: f32 = 0.2;

/// Horizontal viewport window over the timeline scene, in scene pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub left:  f32,
    pub width: f32,
}

impl Viewport {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn center(&self) -> f32 {
        self.left + self.width / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollPolicy {
    /// Active playback: recenter when the playhead leaves the central third.
    Thirds,
    /// Keyboard navigation: jump by one viewport width at the edge margin.
    Paging,
    /// Default: fixed margin from each edge; scroll by overflow + half margin.
    MarginFollow,
}

#[derive(Clone, Copy, Debug)]
pub struct AutoScroll {
    pub enabled: bool,
    pub margin:  f32,
    pub smooth:  bool,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self {
            enabled: true,
            margin:  SCROLL_MARGIN,
            smooth:  true,
        }
    }
}

impl AutoScroll {
    /// Pick the active policy for this frame. Policies are mutually
    /// exclusive: playback wins over keyboard navigation, follow is the rest.
    pub fn policy(playing: bool, keyboard_nav: bool) -> ScrollPolicy {
        if playing {
            ScrollPolicy::Thirds
        } else if keyboard_nav {
            ScrollPolicy::Paging
        } else {
            ScrollPolicy::MarginFollow
        }
    }

    /// Target viewport center for playhead pixel `x`, or None when `x` is
    /// already acceptably visible under the given policy.
    pub fn target_center(&self, policy: ScrollPolicy, x: f32, vp: Viewport) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        match policy {
            ScrollPolicy::Thirds => {
                let third = vp.width / 3.0;
                if x < vp.left + third || x > vp.right() - third {
                    Some(x)
                } else {
                    None
                }
            }
            ScrollPolicy::Paging => {
                if x > vp.right() - self.margin {
                    Some(x + vp.width / 2.0)
                } else if x < vp.left + self.margin {
                    Some(x - vp.width / 2.0)
                } else {
                    None
                }
            }
            ScrollPolicy::MarginFollow => {
                let left_trigger  = vp.left + self.margin;
                let right_trigger = vp.right() - self.margin;
                if x > right_trigger {
                    let overflow = x - right_trigger;
                    Some(vp.center() + overflow + self.margin / 2.0)
                } else if x < left_trigger {
                    let underflow = left_trigger - x;
                    Some(vp.center() - underflow - self.margin / 2.0)
                } else {
                    None
                }
            }
        }
    }
}

/// Quadratic ease-in-out, matching the interpolation curve the scroll
/// animation ran under in the reference player.
fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Bounded-duration eased interpolation between two scroll offsets.
#[derive(Clone, Copy, Debug)]
pub struct ScrollAnimation {
    from:     f32,
    to:       f32,
    duration: f32,
    elapsed:  f32,
}

impl ScrollAnimation {
    pub fn new(from: f32, to: f32) -> Self {
        Self {
            from,
            to,
            duration: SCROLL_ANIM_SECS,
            elapsed: 0.0,
        }
    }

    /// Retarget mid-flight: restart from the current interpolated value so a
    /// new target never causes a visible jump.
    pub fn retarget(&mut self, to: f32) {
        *self = Self::new(self.value(), to);
    }

    /// Advance by `dt` seconds and return the current offset.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        };
        self.from + (self.to - self.from) * ease_in_out(t)
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> f32 {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport { left: 1_000.0, width: 600.0 };

    #[test]
    fn thirds_recenters_outside_central_third() {
        let sc = AutoScroll::default();
        // Central third is [1200, 1400].
        assert_eq!(sc.target_center(ScrollPolicy::Thirds, 1_300.0, VP), None);
        assert_eq!(sc.target_center(ScrollPolicy::Thirds, 1_150.0, VP), Some(1_150.0));
        assert_eq!(sc.target_center(ScrollPolicy::Thirds, 1_450.0, VP), Some(1_450.0));
    }

    #[test]
    fn paging_jumps_half_viewport_past_the_edge() {
        let sc = AutoScroll::default();
        assert_eq!(sc.target_center(ScrollPolicy::Paging, 1_580.0, VP), Some(1_880.0));
        assert_eq!(sc.target_center(ScrollPolicy::Paging, 1_010.0, VP), Some(710.0));
        assert_eq!(sc.target_center(ScrollPolicy::Paging, 1_300.0, VP), None);
    }

    #[test]
    fn margin_follow_scrolls_by_overflow_plus_half_margin() {
        let sc = AutoScroll::default();
        // Right trigger is 1570; x=1590 overflows by 20.
        let target = sc
            .target_center(ScrollPolicy::MarginFollow, 1_590.0, VP)
            .unwrap();
        assert_eq!(target, VP.center() + 20.0 + SCROLL_MARGIN / 2.0);
        // Inside the margins — no scroll.
        assert_eq!(sc.target_center(ScrollPolicy::MarginFollow, 1_300.0, VP), None);
    }

    #[test]
    fn disabled_controller_never_scrolls() {
        let sc = AutoScroll { enabled: false, ..Default::default() };
        assert_eq!(sc.target_center(ScrollPolicy::Thirds, 0.0, VP), None);
        assert_eq!(sc.target_center(ScrollPolicy::MarginFollow, 9_999.0, VP), None);
    }

    #[test]
    fn policy_selection_is_mutually_exclusive() {
        assert_eq!(AutoScroll::policy(true, true), ScrollPolicy::Thirds);
        assert_eq!(AutoScroll::policy(false, true), ScrollPolicy::Paging);
        assert_eq!(AutoScroll::policy(false, false), ScrollPolicy::MarginFollow);
    }

    #[test]
    fn animation_runs_from_start_to_target() {
        let mut anim = ScrollAnimation::new(0.0, 100.0);
        assert_eq!(anim.value(), 0.0);
        let mid = anim.advance(SCROLL_ANIM_SECS / 2.0);
        assert!(mid > 0.0 && mid < 100.0);
        let done = anim.advance(SCROLL_ANIM_SECS);
        assert_eq!(done, 100.0);
        assert!(anim.finished());
    }

    #[test]
    fn retarget_continues_from_current_value() {
        let mut anim = ScrollAnimation::new(0.0, 100.0);
        anim.advance(SCROLL_ANIM_SECS / 2.0);
        let v = anim.value();
        anim.retarget(500.0);
        assert_eq!(anim.value(), v);
        assert_eq!(anim.target(), 500.0);
    }
}
