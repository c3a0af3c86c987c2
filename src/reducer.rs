//! The closed set of workspace edits and the pure function applying them.
//!
//! `apply` never touches its input. It clones the workspace (cheap, children
//! are shared) and edits the clone through copy-on-write accessors, so only
//! the nodes on the path to the edit are duplicated. An action whose target
//! no longer resolves is a silent no-op: the UI may dispatch against a tree
//! that changed underneath it.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::ModelError;
use crate::index::build_indexes;
use crate::model::{
    Client, Comment, Group, Location, NodeKind, NodeRef, Person, Program, Project, ProjectStatus,
    ResourceType, Tag, Task, TaskStatus, Workspace,
};
use crate::model::node::MAX_ALLOCATION;

/// Source of fresh node ids, injected so `apply` stays deterministic under test.
pub trait IdGenerator {
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Random v4 UUIDs, for the running application.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4())
    }
}

/// `prefix-1`, `prefix-2`, ... shared across prefixes.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{}-{}", prefix, self.next)
    }
}

fn prefix_for(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Client => "client",
        NodeKind::Program => "prog",
        NodeKind::Project => "proj",
        NodeKind::Person => "person",
        NodeKind::Task => "task",
    }
}

/// Fields to merge into an existing project. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Fields to merge into an existing task. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    /// Assigns a person and clears any group assignment.
    #[serde(default)]
    pub assignee_id: Option<String>,
    /// Assigns a group and clears any person assignment.
    #[serde(default)]
    pub assignee_group_id: Option<String>,
}

impl TaskPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Identity fields to merge into every assignment node of one person.
/// `None` leaves a field alone; node ids and assignments are never touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPatch {
    pub person_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Replaces the whole tag list.
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
    #[serde(default)]
    pub monthly_cost: Option<f64>,
    #[serde(default)]
    pub billable_rate: Option<f64>,
}

impl PersonPatch {
    pub fn new(person_id: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            ..Default::default()
        }
    }

    fn merge_into(&self, person: &mut Person) {
        if let Some(name) = &self.name {
            person.name = name.clone();
        }
        if let Some(role) = &self.role {
            person.role = role.clone();
        }
        if let Some(email) = &self.email {
            person.email = email.clone();
        }
        if let Some(tags) = &self.tags {
            person.tags = tags.clone();
        }
        if let Some(kind) = self.resource_type {
            person.resource_type = Some(kind);
        }
        if let Some(cost) = self.monthly_cost.filter(|c| *c >= 0.0) {
            person.monthly_cost = Some(cost);
        }
        if let Some(rate) = self.billable_rate.filter(|r| *r >= 0.0) {
            person.billable_rate = Some(rate);
        }
    }
}

/// Every structural edit the workspace accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    AddClient {
        name: String,
        #[serde(default)]
        strategic_focus: String,
    },
    #[serde(rename_all = "camelCase")]
    AddProgram { name: String, client_id: String },
    #[serde(rename_all = "camelCase")]
    AddProject {
        name: String,
        program_id: String,
        #[serde(default)]
        brief: String,
        #[serde(default)]
        budget: Option<f64>,
    },
    UpdateProject(ProjectPatch),
    AddTask(Task),
    UpdateTask(TaskPatch),
    #[serde(rename_all = "camelCase")]
    DeleteNode { id: String, kind: NodeKind },
    #[serde(rename_all = "camelCase")]
    AddPerson { project_id: String, person: Person },
    UpdatePerson(PersonPatch),
    #[serde(rename_all = "camelCase")]
    AddGroup { name: String },
    #[serde(rename_all = "camelCase")]
    AddPersonToGroup { group_id: String, person_id: String },
    #[serde(rename_all = "camelCase")]
    RemovePersonFromGroup { group_id: String, person_id: String },
    #[serde(rename_all = "camelCase")]
    DeleteGroup { group_id: String },
    #[serde(rename_all = "camelCase")]
    AssignGroupToProject { group_id: String, project_id: String },
    #[serde(rename_all = "camelCase")]
    AddComment {
        task_id: String,
        author: String,
        text: String,
    },
}

const ACTION_TYPES: &[&str] = &[
    "ADD_CLIENT",
    "ADD_PROGRAM",
    "ADD_PROJECT",
    "UPDATE_PROJECT",
    "ADD_TASK",
    "UPDATE_TASK",
    "DELETE_NODE",
    "ADD_PERSON",
    "UPDATE_PERSON",
    "ADD_GROUP",
    "ADD_PERSON_TO_GROUP",
    "REMOVE_PERSON_FROM_GROUP",
    "DELETE_GROUP",
    "ASSIGN_GROUP_TO_PROJECT",
    "ADD_COMMENT",
];

impl Action {
    /// Decode a loosely-typed `{ "type": ..., ... }` action object.
    pub fn from_json(value: Value) -> Result<Action, ModelError> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if !ACTION_TYPES.contains(&tag.as_str()) {
            return Err(ModelError::UnknownAction(tag));
        }
        serde_json::from_value(value).map_err(|e| ModelError::InvalidAction {
            action: tag,
            reason: e.to_string(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::AddClient { .. } => "ADD_CLIENT",
            Action::AddProgram { .. } => "ADD_PROGRAM",
            Action::AddProject { .. } => "ADD_PROJECT",
            Action::UpdateProject(_) => "UPDATE_PROJECT",
            Action::AddTask(_) => "ADD_TASK",
            Action::UpdateTask(_) => "UPDATE_TASK",
            Action::DeleteNode { .. } => "DELETE_NODE",
            Action::AddPerson { .. } => "ADD_PERSON",
            Action::UpdatePerson(_) => "UPDATE_PERSON",
            Action::AddGroup { .. } => "ADD_GROUP",
            Action::AddPersonToGroup { .. } => "ADD_PERSON_TO_GROUP",
            Action::RemovePersonFromGroup { .. } => "REMOVE_PERSON_FROM_GROUP",
            Action::DeleteGroup { .. } => "DELETE_GROUP",
            Action::AssignGroupToProject { .. } => "ASSIGN_GROUP_TO_PROJECT",
            Action::AddComment { .. } => "ADD_COMMENT",
        }
    }
}

/// Apply one action, returning the new workspace.
pub fn apply(state: &Workspace, action: Action, ids: &mut dyn IdGenerator) -> Workspace {
    let name = action.name();
    match try_apply(state, action, ids) {
        Some(next) => next,
        None => {
            debug!(action = name, "action did not resolve, workspace unchanged");
            state.clone()
        }
    }
}

/// `None` means the action was a no-op.
fn try_apply(state: &Workspace, action: Action, ids: &mut dyn IdGenerator) -> Option<Workspace> {
    let mut next = state.clone();
    match action {
        Action::AddClient {
            name,
            strategic_focus,
        } => {
            let name = non_empty(name)?;
            let mut client = Client::new(ids.next_id(prefix_for(NodeKind::Client)), name);
            client.strategic_focus = strategic_focus;
            next.tree.clients.push(Arc::new(client));
        }

        Action::AddProgram { name, client_id } => {
            let name = non_empty(name)?;
            let Location::Client(c) = next.tree.locate_kind(&client_id, NodeKind::Client)? else {
                return None;
            };
            let program = Program::new(ids.next_id(prefix_for(NodeKind::Program)), name);
            next.tree.client_mut(c).programs.push(Arc::new(program));
        }

        Action::AddProject {
            name,
            program_id,
            brief,
            budget,
        } => {
            let Location::Program(c, p) = next.tree.locate_kind(&program_id, NodeKind::Program)?
            else {
                return None;
            };
            let mut project = Project::new(ids.next_id(prefix_for(NodeKind::Project)), name);
            project.brief = brief;
            project.budget = budget.filter(|b| *b >= 0.0);
            project.status = ProjectStatus::Pending;
            next.tree.program_mut(c, p).projects.push(Arc::new(project));
        }

        Action::UpdateProject(patch) => {
            let Location::Project(c, p, j) = next.tree.locate_kind(&patch.id, NodeKind::Project)?
            else {
                return None;
            };
            let project = next.tree.project_mut(c, p, j);
            if let Some(name) = patch.name {
                project.name = name;
            }
            if let Some(brief) = patch.brief {
                project.brief = brief;
            }
            if let Some(budget) = patch.budget.filter(|b| *b >= 0.0) {
                project.budget = Some(budget);
            }
            if let Some(status) = patch.status {
                project.status = status;
            }
        }

        Action::AddTask(mut task) => {
            if task.end_date < task.start_date {
                return None;
            }
            let Location::Project(c, p, j) =
                next.tree.locate_kind(&task.project_id, NodeKind::Project)?
            else {
                return None;
            };
            if task.id.is_empty() || next.tree.contains_id(&task.id) {
                task.id = ids.next_id(prefix_for(NodeKind::Task));
            }
            next.tree.project_mut(c, p, j).tasks.push(Arc::new(task));
        }

        Action::UpdateTask(patch) => {
            let Location::Task(c, p, j, k) = next.tree.locate_kind(&patch.id, NodeKind::Task)?
            else {
                return None;
            };
            let current = &state.tree.clients[c].programs[p].projects[j].tasks[k];
            let start = patch.start_date.unwrap_or(current.start_date);
            let end = patch.end_date.unwrap_or(current.end_date);
            if end < start {
                return None;
            }
            let task = next.tree.task_mut(c, p, j, k);
            task.start_date = start;
            task.end_date = end;
            if let Some(name) = patch.name {
                task.name = name;
            }
            if let Some(status) = patch.status {
                task.status = status;
            }
            if let Some(hours) = patch.estimated_hours.filter(|h| *h >= 0.0) {
                task.estimated_hours = hours;
            }
            if let Some(person) = patch.assignee_id {
                task.assign_person(person);
            } else if let Some(group) = patch.assignee_group_id {
                task.assign_group(group);
            }
        }

        Action::DeleteNode { id, kind } => {
            let loc = next.tree.locate_kind(&id, kind)?;
            next.tree.remove_at(loc);
        }

        Action::AddPerson {
            project_id,
            mut person,
        } => {
            if person.person_id.is_empty()
                || person.assignments.iter().any(|a| a.allocation > MAX_ALLOCATION)
            {
                return None;
            }
            let Location::Project(c, p, j) = next.tree.locate_kind(&project_id, NodeKind::Project)?
            else {
                return None;
            };
            if person.id.is_empty() || next.tree.contains_id(&person.id) {
                person.id = ids.next_id(prefix_for(NodeKind::Person));
            }
            next.tree.project_mut(c, p, j).people.push(Arc::new(person));
        }

        Action::UpdatePerson(mut patch) => {
            if let Some(name) = patch.name.take() {
                patch.name = Some(non_empty(name)?);
            }
            let locations = state.tree.person_locations(&patch.person_id);
            let mut changed = false;
            for loc in locations {
                let Some(NodeRef::Person(current)) = state.tree.node_at(loc) else {
                    continue;
                };
                let mut updated = current.clone();
                patch.merge_into(&mut updated);
                if updated != *current {
                    *next.tree.person_mut(loc)? = updated;
                    changed = true;
                }
            }
            if !changed {
                return None;
            }
        }

        Action::AddGroup { name } => {
            let name = non_empty(name)?;
            next.groups
                .push(Arc::new(Group::new(ids.next_id("group"), name)));
        }

        Action::AddPersonToGroup {
            group_id,
            person_id,
        } => {
            let group = state.find_group(&group_id)?;
            if group.contains(&person_id) {
                // Already a member: keep the shared group as is.
                return Some(next);
            }
            next.group_mut(&group_id)?.add_member(person_id);
        }

        Action::RemovePersonFromGroup {
            group_id,
            person_id,
        } => {
            if !state.find_group(&group_id)?.contains(&person_id) {
                return None;
            }
            next.group_mut(&group_id)?.remove_member(&person_id);
        }

        Action::DeleteGroup { group_id } => {
            let before = next.groups.len();
            next.groups.retain(|g| g.id != group_id);
            if next.groups.len() == before {
                return None;
            }
        }

        Action::AssignGroupToProject {
            group_id,
            project_id,
        } => {
            let group = state.find_group(&group_id)?;
            let Location::Project(c, p, j) = next.tree.locate_kind(&project_id, NodeKind::Project)?
            else {
                return None;
            };
            // Identity is copied from an existing assignment of the same person.
            let indexes = build_indexes(&state.tree).ok()?;
            let existing = &state.tree.clients[c].programs[p].projects[j];
            let newcomers: Vec<Person> = group
                .members
                .iter()
                .filter(|pid| !existing.has_person(pid))
                .filter_map(|pid| indexes.person(pid))
                .map(|identity| {
                    let mut person = identity.clone();
                    person.id = ids.next_id(prefix_for(NodeKind::Person));
                    person.assignments.clear();
                    person
                })
                .collect();
            if newcomers.is_empty() {
                return None;
            }
            let project = next.tree.project_mut(c, p, j);
            project
                .people
                .extend(newcomers.into_iter().map(Arc::new));
        }

        Action::AddComment {
            task_id,
            author,
            text,
        } => {
            let Location::Task(c, p, j, k) = next.tree.locate_kind(&task_id, NodeKind::Task)?
            else {
                return None;
            };
            next.tree
                .task_mut(c, p, j, k)
                .comments
                .push(Comment { author, text });
        }
    }
    Some(next)
}

fn non_empty(name: String) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_action_type_is_rejected() {
        let err = Action::from_json(json!({ "type": "EDIT_TASK", "task": {} })).unwrap_err();
        assert_eq!(err, ModelError::UnknownAction("EDIT_TASK".into()));
        assert_eq!(
            Action::from_json(json!({ "name": "no tag" })).unwrap_err(),
            ModelError::UnknownAction(String::new())
        );
    }

    #[test]
    fn known_action_decodes_from_loose_json() {
        let action = Action::from_json(json!({
            "type": "ADD_PERSON_TO_GROUP", "groupId": "g1", "personId": "p1"
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::AddPersonToGroup {
                group_id: "g1".into(),
                person_id: "p1".into()
            }
        );

        let patch = Action::from_json(json!({ "type": "UPDATE_PROJECT", "id": "x", "status": "Active" }))
            .unwrap();
        assert!(matches!(patch, Action::UpdateProject(ProjectPatch { status: Some(ProjectStatus::Active), .. })));
    }

    #[test]
    fn known_action_with_bad_fields_is_invalid() {
        let err = Action::from_json(json!({ "type": "ADD_PROGRAM", "name": "P" })).unwrap_err();
        assert!(matches!(err, ModelError::InvalidAction { ref action, .. } if action == "ADD_PROGRAM"));
    }

    #[test]
    fn sequential_ids_are_prefixed() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.next_id("client"), "client-1");
        assert_eq!(ids.next_id("task"), "task-2");
    }
}
