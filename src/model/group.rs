use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named set of people, referenced by `person_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: BTreeSet::new(),
        }
    }

    /// Returns false if the person was already a member.
    pub fn add_member(&mut self, person_id: impl Into<String>) -> bool {
        self.members.insert(person_id.into())
    }

    pub fn remove_member(&mut self, person_id: &str) -> bool {
        self.members.remove(person_id)
    }

    pub fn contains(&self, person_id: &str) -> bool {
        self.members.contains(person_id)
    }
}
