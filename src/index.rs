//! Flat lookup maps derived from the work tree.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ModelError;
use crate::model::{Person, Program, Project, WorkTree};

/// Read-only lookups over one tree snapshot. Rebuild whenever the tree changes.
#[derive(Debug, Clone, Default)]
pub struct Indexes {
    /// Keyed by `person_id`. When a person is assigned to several projects the
    /// assignment node visited last wins.
    pub person_by_id: HashMap<String, Arc<Person>>,
    pub project_by_id: HashMap<String, Arc<Project>>,
    pub program_by_id: HashMap<String, Arc<Program>>,
    /// Every assignment node id per `person_id`, in visit order.
    pub assignments_by_person: HashMap<String, Vec<String>>,
}

impl Indexes {
    pub fn person(&self, person_id: &str) -> Option<&Person> {
        self.person_by_id.get(person_id).map(|p| p.as_ref())
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.project_by_id.get(id).map(|p| p.as_ref())
    }

    /// Distinct people, sorted by name.
    pub fn people_sorted(&self) -> Vec<&Person> {
        let mut people: Vec<&Person> = self.person_by_id.values().map(|p| p.as_ref()).collect();
        people.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.person_id.cmp(&b.person_id)));
        people
    }
}

/// Traverse the tree once, depth-first, and build the lookup maps.
///
/// Fails if an assignment node carries an empty `person_id`.
pub fn build_indexes(tree: &WorkTree) -> Result<Indexes, ModelError> {
    let mut idx = Indexes::default();
    for client in &tree.clients {
        for program in &client.programs {
            idx.program_by_id
                .insert(program.id.clone(), Arc::clone(program));
            for project in &program.projects {
                idx.project_by_id
                    .insert(project.id.clone(), Arc::clone(project));
                for person in &project.people {
                    if person.person_id.is_empty() {
                        return Err(ModelError::malformed(
                            format!("{}/{}/{}", client.id, program.id, person.id),
                            "person node has no personId",
                        ));
                    }
                    idx.person_by_id
                        .insert(person.person_id.clone(), Arc::clone(person));
                    idx.assignments_by_person
                        .entry(person.person_id.clone())
                        .or_default()
                        .push(person.id.clone());
                }
            }
        }
    }
    tracing::debug!(
        people = idx.person_by_id.len(),
        projects = idx.project_by_id.len(),
        "rebuilt indexes"
    );
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Client, Person, Program, Project};

    fn tree_with(people: Vec<(&str, Person)>) -> WorkTree {
        let mut program = Program::new("pg", "Program");
        for (project_id, person) in people {
            let existing = program.projects.iter().position(|p| p.id == project_id);
            match existing {
                Some(i) => Arc::make_mut(&mut program.projects[i])
                    .people
                    .push(Arc::new(person)),
                None => {
                    let mut project = Project::new(project_id, project_id);
                    project.people.push(Arc::new(person));
                    program.projects.push(Arc::new(project));
                }
            }
        }
        let mut client = Client::new("c", "Client");
        client.programs.push(Arc::new(program));
        WorkTree::new(vec![client])
    }

    #[test]
    fn last_assignment_wins_in_person_index() {
        let tree = tree_with(vec![
            ("x", Person::new("n1", "p1", "Alice").with_role("Designer")),
            ("y", Person::new("n2", "p1", "Alice").with_role("Lead")),
        ]);
        let idx = build_indexes(&tree).unwrap();
        assert_eq!(idx.person("p1").unwrap().role, "Lead");
        assert_eq!(idx.assignments_by_person["p1"], vec!["n1", "n2"]);
        assert_eq!(idx.project_by_id.len(), 2);
        assert!(idx.program_by_id.contains_key("pg"));
    }

    #[test]
    fn empty_person_id_is_malformed() {
        let tree = tree_with(vec![("x", Person::new("n1", "", "Ghost"))]);
        assert!(matches!(
            build_indexes(&tree),
            Err(ModelError::MalformedTree { .. })
        ));
    }
}
