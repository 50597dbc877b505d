// crates/matchline-core/src/events.rs
//
// Marker records, the event-catalogue lookup surface, and the outbound
// notifications collaborators consume. The catalogue is owned by an external
// collaborator — we hold a lookup table of render styles keyed by event type
// and never use it for timeline math.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tactical-event marker attached to a clip. Time range is in source
/// milliseconds of the clip it references, so markers survive zoom and
/// layout changes untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id:         Uuid,
    pub clip_id:    Uuid,
    pub start_ms:   f64,
    pub end_ms:     f64,
    pub label:      String,
    pub event_type: String,
}

/// Render style for one event type, as supplied by the catalogue
/// collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventStyle {
    pub color:    [u8; 3],
    pub icon:     String,
    pub category: String,
}

impl EventStyle {
    fn new(color: [u8; 3], icon: &str, category: &str) -> Self {
        Self {
            color,
            icon: icon.into(),
            category: category.into(),
        }
    }
}

/// event_type → style lookup. Unknown types get a neutral fallback so a
/// catalogue edit on the collaborator side can never break marker rendering.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventCatalogue {
    styles: HashMap<String, EventStyle>,
}

impl EventCatalogue {
    pub fn from_styles(styles: HashMap<String, EventStyle>) -> Self {
        Self { styles }
    }

    /// The built-in table mirrors the stock tactical catalogue shipped with
    /// the analyzer; the collaborator replaces it wholesale on project load.
    pub fn builtin() -> Self {
        let mut styles = HashMap::new();
        styles.insert("press_start".into(),   EventStyle::new([255, 193, 7], "🟨", "defense"));
        styles.insert("defensive_action".into(), EventStyle::new([255, 193, 7], "📊", "defense"));
        styles.insert("mismatch".into(),      EventStyle::new([255, 193, 7], "❗", "defense"));
        styles.insert("build_up".into(),      EventStyle::new([255, 106, 7], "🔄", "attack"));
        styles.insert("finishing".into(),     EventStyle::new([255, 106, 7], "🎯", "attack"));
        styles.insert("turnover".into(),      EventStyle::new([255, 106, 7], "🎯", "attack"));
        styles.insert("recovery_run".into(),  EventStyle::new([33, 150, 243], "↩", "transition"));
        styles.insert("counter".into(),       EventStyle::new([33, 150, 243], "⚡", "transition"));
        styles.insert("set_piece".into(),     EventStyle::new([0, 106, 7], "⚡", "set_piece"));
        styles.insert("goal".into(),          EventStyle::new([230, 32, 230], "⚽", "goal"));
        Self { styles }
    }

    pub fn style(&self, event_type: &str) -> EventStyle {
        self.styles
            .get(event_type)
            .cloned()
            .unwrap_or_else(|| EventStyle::new([158, 158, 158], "📌", "custom"))
    }
}

/// Outbound notifications queued by TimelineState and drained by the app for
/// delivery to collaborators (annotation panel, status surface).
#[derive(Clone, Debug, PartialEq)]
pub enum TimelineEvent {
    /// A partial selection survived the mis-click threshold. Times are in
    /// source milliseconds, start ≤ end.
    SelectionCommitted {
        clip_id:  Uuid,
        start_ms: f64,
        end_ms:   f64,
    },
    /// A marker was attached to a clip.
    MarkerAttached { marker: Marker },
    /// Structural layout changed (add/remove/split) — collaborators holding
    /// clip ids should refresh.
    StructureChanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_type_gets_fallback_style() {
        let cat = EventCatalogue::builtin();
        let style = cat.style("definitely_not_in_catalogue");
        assert_eq!(style.category, "custom");
    }

    #[test]
    fn builtin_catalogue_resolves_known_types() {
        let cat = EventCatalogue::builtin();
        assert_eq!(cat.style("goal").category, "goal");
        assert_eq!(cat.style("counter").category, "transition");
    }
}
