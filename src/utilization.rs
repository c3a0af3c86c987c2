//! How much of each person's time is booked on a given day.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::model::{Assignment, WorkTree};

/// Allocation above this percentage counts as over-utilized.
pub const FULL_ALLOCATION: u32 = 100;

/// Every distinct assignment of every person. A person's assignment list is
/// repeated under each project they appear in, so entries are deduplicated
/// on the project they book.
fn assignments_by_person(tree: &WorkTree) -> HashMap<&str, BTreeMap<&str, &Assignment>> {
    let mut out: HashMap<&str, BTreeMap<&str, &Assignment>> = HashMap::new();
    for person in tree.people() {
        let entry = out.entry(person.person_id.as_str()).or_default();
        for a in &person.assignments {
            entry.insert(a.project_id.as_str(), a);
        }
    }
    out
}

/// Sum of allocation percentages of the assignments active on `on`, keyed by
/// `person_id`. People with nothing active are reported as 0.
pub fn allocation_by_person(tree: &WorkTree, on: NaiveDate) -> BTreeMap<String, u32> {
    assignments_by_person(tree)
        .into_iter()
        .map(|(pid, assignments)| {
            let total = assignments
                .values()
                .filter(|a| a.is_active_on(on))
                .map(|a| u32::from(a.allocation))
                .sum();
            (pid.to_string(), total)
        })
        .collect()
}

/// `person_id`s booked above [`FULL_ALLOCATION`] on `on`, with their totals.
pub fn over_utilized(tree: &WorkTree, on: NaiveDate) -> Vec<(String, u32)> {
    allocation_by_person(tree, on)
        .into_iter()
        .filter(|(_, total)| *total > FULL_ALLOCATION)
        .collect()
}
