//! Selection state and the project highlighting derived from it.

use std::collections::{BTreeSet, HashMap};

use egui::Pos2;

use crate::model::{Person, TagType, WorkTree};

/// Vertical lift of an affinity curve's control point, relative to the
/// horizontal distance between its endpoints.
pub const CURVE_LIFT: f32 = 0.4;

/// What currently drives highlighting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    None,
    Person(String),
    Tag { tag_type: TagType, value: String },
}

impl Selection {
    pub fn tag(tag_type: impl Into<TagType>, value: impl Into<String>) -> Self {
        Selection::Tag {
            tag_type: tag_type.into(),
            value: value.into(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// Selecting the active selection again clears it.
    pub fn toggle(&self, next: Selection) -> Selection {
        if *self == next {
            Selection::None
        } else {
            next
        }
    }
}

/// Selection plus the subject of the person detail panel, if open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    pub selection: Selection,
    pub person_detail: Option<String>,
}

impl HighlightState {
    pub fn select(&mut self, next: Selection) {
        if let (Selection::Person(pid), Some(subject)) = (&next, &self.person_detail) {
            if subject != pid {
                self.person_detail = Some(pid.clone());
            }
        }
        self.selection = self.selection.toggle(next);
    }

    pub fn open_person_detail(&mut self, person_id: impl Into<String>) {
        self.person_detail = Some(person_id.into());
    }

    pub fn close_person_detail(&mut self) {
        self.person_detail = None;
    }

    pub fn clear(&mut self) {
        self.selection = Selection::None;
    }
}

/// Ids of the projects whose direct assignment nodes match `selection`.
pub fn compute_highlights(tree: &WorkTree, selection: &Selection) -> BTreeSet<String> {
    if selection.is_none() {
        return BTreeSet::new();
    }
    let matches_person = |p: &Person| match selection {
        Selection::None => false,
        Selection::Person(pid) => p.person_id == *pid,
        Selection::Tag { tag_type, value } => p.has_tag(tag_type, value),
    };
    tree.projects()
        .filter(|project| project.people.iter().any(|p| matches_person(p.as_ref())))
        .map(|project| project.id.clone())
        .collect()
}

/// A quadratic curve joining two highlighted projects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub from: Pos2,
    pub control: Pos2,
    pub to: Pos2,
}

/// One curve per unordered pair of highlighted projects with a known screen
/// position. Projects the renderer has not placed are skipped.
pub fn compute_connections(
    highlighted: &BTreeSet<String>,
    positions: &HashMap<String, Pos2>,
) -> Vec<Connection> {
    let placed: Vec<Pos2> = highlighted
        .iter()
        .filter_map(|id| positions.get(id).copied())
        .collect();
    let mut connections = Vec::new();
    for (i, from) in placed.iter().enumerate() {
        for to in &placed[i + 1..] {
            let mid = Pos2::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
            let lift = CURVE_LIFT * (to.x - from.x).abs();
            connections.push(Connection {
                from: *from,
                control: Pos2::new(mid.x, mid.y - lift),
                to: *to,
            });
        }
    }
    connections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_clears_repeated_selection() {
        let s = Selection::Person("p1".into());
        assert_eq!(Selection::None.toggle(s.clone()).toggle(s.clone()), Selection::None);
        assert_eq!(s.toggle(Selection::tag("Skill", "Design")), Selection::tag("Skill", "Design"));
    }

    #[test]
    fn selecting_another_person_retargets_open_detail() {
        let mut state = HighlightState::default();
        state.open_person_detail("p1");
        state.select(Selection::Person("p2".into()));
        assert_eq!(state.person_detail.as_deref(), Some("p2"));
        assert_eq!(state.selection, Selection::Person("p2".into()));

        // A tag selection leaves the detail subject alone.
        state.select(Selection::tag("Team", "Finance"));
        assert_eq!(state.person_detail.as_deref(), Some("p2"));
    }

    #[test]
    fn detail_stays_closed_when_not_open() {
        let mut state = HighlightState::default();
        state.select(Selection::Person("p1".into()));
        assert_eq!(state.person_detail, None);
    }

    #[test]
    fn curve_control_point_is_lifted_midpoint() {
        let highlighted: BTreeSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let positions = HashMap::from([
            ("a".to_string(), Pos2::new(0.0, 100.0)),
            ("b".to_string(), Pos2::new(100.0, 100.0)),
        ]);
        let curves = compute_connections(&highlighted, &positions);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].control, Pos2::new(50.0, 60.0));
    }

    #[test]
    fn all_pairs_are_connected() {
        let ids = ["a", "b", "c", "d"];
        let highlighted: BTreeSet<String> = ids.iter().map(|s| s.to_string()).collect();
        let positions: HashMap<String, Pos2> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), Pos2::new(i as f32 * 10.0, 0.0)))
            .collect();
        assert_eq!(compute_connections(&highlighted, &positions).len(), 6);

        let single: BTreeSet<String> = ["a".to_string()].into();
        assert!(compute_connections(&single, &positions).is_empty());
    }
}
