//! Persisted document form of a workspace.
//!
//! The document store speaks loosely-typed JSON: every node is an object with a
//! `type` tag, an `id`, a `name`, optional `children`, and a project may also
//! carry a `tasks` array. Decoding validates the tag set and the containment
//! rules and is the only place a [`ModelError::MalformedTree`] is produced.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::group::Group;
use super::node::{Client, NodeKind, Person, Program, Project, ProjectStatus, Task, MAX_ALLOCATION};
use super::tree::{WorkTree, Workspace};
use crate::error::ModelError;

pub const DOCUMENT_VERSION: u32 = 1;

/// A node as stored, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<DocNode>,
    /// Variant-specific attributes (`brief`, `personId`, `startDate`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub clients: Vec<DocNode>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl WorkspaceDocument {
    pub fn from_workspace(workspace: &Workspace) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            clients: encode_tree(&workspace.tree),
            groups: workspace.groups.iter().map(|g| g.as_ref().clone()).collect(),
        }
    }

    pub fn into_workspace(self) -> Result<Workspace, ModelError> {
        let tree = decode_tree(&self.clients)?;
        Ok(Workspace::new(tree, self.groups))
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ClientFields {
    strategic_focus: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ProjectFields {
    brief: String,
    budget: Option<f64>,
    status: ProjectStatus,
}

/// Validate and convert stored client nodes into a typed tree.
pub fn decode_tree(clients: &[DocNode]) -> Result<WorkTree, ModelError> {
    let mut tree = WorkTree::default();
    for (i, node) in clients.iter().enumerate() {
        let path = format!("clients[{}]", i);
        expect_kind(node, NodeKind::Client, &path)?;
        tree.clients.push(Arc::new(decode_client(node, &path)?));
    }
    Ok(tree)
}

fn decode_client(node: &DocNode, path: &str) -> Result<Client, ModelError> {
    let fields: ClientFields = parse_fields(&node.fields, path)?;
    let mut client = Client::new(&node.id, &node.name);
    client.strategic_focus = fields.strategic_focus;
    for (i, child) in node.children.iter().enumerate() {
        let child_path = format!("{}/children[{}]", path, i);
        expect_kind(child, NodeKind::Program, &child_path)?;
        client
            .programs
            .push(Arc::new(decode_program(child, &child_path)?));
    }
    Ok(client)
}

fn decode_program(node: &DocNode, path: &str) -> Result<Program, ModelError> {
    let mut program = Program::new(&node.id, &node.name);
    for (i, child) in node.children.iter().enumerate() {
        let child_path = format!("{}/children[{}]", path, i);
        expect_kind(child, NodeKind::Project, &child_path)?;
        program
            .projects
            .push(Arc::new(decode_project(child, &child_path)?));
    }
    Ok(program)
}

fn decode_project(node: &DocNode, path: &str) -> Result<Project, ModelError> {
    let fields: ProjectFields = parse_fields(&node.fields, path)?;
    let mut project = Project::new(&node.id, &node.name);
    project.brief = fields.brief;
    project.budget = fields.budget;
    project.status = fields.status;
    if let Some(budget) = project.budget {
        if budget < 0.0 {
            return Err(ModelError::malformed(path, "project budget is negative"));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let child_path = format!("{}/children[{}]", path, i);
        match node_kind(child, &child_path)? {
            NodeKind::Person => project
                .people
                .push(Arc::new(decode_person(child, &child_path)?)),
            NodeKind::Task => project
                .tasks
                .push(Arc::new(decode_task(child, &project.id, &child_path)?)),
            other => {
                return Err(ModelError::malformed(
                    child_path,
                    format!("a {} cannot be placed under a project", other),
                ))
            }
        }
    }

    // The `tasks` array may omit the type tag; anything present must be a task.
    for (i, child) in node.tasks.iter().enumerate() {
        let child_path = format!("{}/tasks[{}]", path, i);
        if child.kind.is_some() {
            expect_kind(child, NodeKind::Task, &child_path)?;
        }
        project
            .tasks
            .push(Arc::new(decode_task(child, &project.id, &child_path)?));
    }
    Ok(project)
}

fn decode_person(node: &DocNode, path: &str) -> Result<Person, ModelError> {
    let has_person_id = node
        .fields
        .get("personId")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    if !has_person_id {
        return Err(ModelError::malformed(path, "person node has no personId"));
    }
    let person: Person = parse_fields(&leaf_object(node), path)?;
    if let Some(a) = person.assignments.iter().find(|a| a.allocation > MAX_ALLOCATION) {
        return Err(ModelError::malformed(
            path,
            format!("allocation {}% on {} exceeds 100%", a.allocation, a.project_id),
        ));
    }
    Ok(person)
}

fn decode_task(node: &DocNode, project_id: &str, path: &str) -> Result<Task, ModelError> {
    let mut object = leaf_object(node);
    // Containment decides ownership.
    object.insert("projectId".into(), Value::String(project_id.to_string()));
    let task: Task = parse_fields(&object, path)?;
    if task.end_date < task.start_date {
        return Err(ModelError::malformed(path, "task ends before it starts"));
    }
    Ok(task)
}

fn leaf_object(node: &DocNode) -> Map<String, Value> {
    let mut object = node.fields.clone();
    object.insert("id".into(), Value::String(node.id.clone()));
    object.insert("name".into(), Value::String(node.name.clone()));
    object
}

fn parse_fields<T: serde::de::DeserializeOwned>(
    object: &Map<String, Value>,
    path: &str,
) -> Result<T, ModelError> {
    serde_json::from_value(Value::Object(object.clone()))
        .map_err(|e| ModelError::malformed(path, e.to_string()))
}

fn node_kind(node: &DocNode, path: &str) -> Result<NodeKind, ModelError> {
    let tag = node
        .kind
        .as_deref()
        .ok_or_else(|| ModelError::malformed(path, "node has no type tag"))?;
    NodeKind::parse(tag)
        .ok_or_else(|| ModelError::malformed(path, format!("unrecognized node type '{}'", tag)))
}

fn expect_kind(node: &DocNode, expected: NodeKind, path: &str) -> Result<(), ModelError> {
    let kind = node_kind(node, path)?;
    if kind != expected {
        return Err(ModelError::malformed(
            path,
            format!("expected a {} but found a {}", expected, kind),
        ));
    }
    Ok(())
}

/// Convert a typed tree back into its stored form.
pub fn encode_tree(tree: &WorkTree) -> Vec<DocNode> {
    tree.clients.iter().map(|c| encode_client(c)).collect()
}

fn encode_client(client: &Client) -> DocNode {
    let mut fields = Map::new();
    fields.insert(
        "strategicFocus".into(),
        Value::String(client.strategic_focus.clone()),
    );
    DocNode {
        id: client.id.clone(),
        name: client.name.clone(),
        kind: Some(NodeKind::Client.label().into()),
        children: client.programs.iter().map(|p| encode_program(p)).collect(),
        tasks: Vec::new(),
        fields,
    }
}

fn encode_program(program: &Program) -> DocNode {
    DocNode {
        id: program.id.clone(),
        name: program.name.clone(),
        kind: Some(NodeKind::Program.label().into()),
        children: program.projects.iter().map(|p| encode_project(p)).collect(),
        ..Default::default()
    }
}

fn encode_project(project: &Project) -> DocNode {
    let mut fields = Map::new();
    fields.insert("brief".into(), Value::String(project.brief.clone()));
    if let Some(budget) = project.budget {
        fields.insert("budget".into(), Value::from(budget));
    }
    fields.insert(
        "status".into(),
        Value::String(project.status.label().to_string()),
    );
    DocNode {
        id: project.id.clone(),
        name: project.name.clone(),
        kind: Some(NodeKind::Project.label().into()),
        children: project
            .people
            .iter()
            .map(|p| encode_leaf(p.as_ref(), NodeKind::Person))
            .collect(),
        tasks: project
            .tasks
            .iter()
            .map(|t| encode_leaf(t.as_ref(), NodeKind::Task))
            .collect(),
        fields,
    }
}

fn encode_leaf<T: Serialize>(value: &T, kind: NodeKind) -> DocNode {
    let mut fields = match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let id = take_string(&mut fields, "id");
    let name = take_string(&mut fields, "name");
    DocNode {
        id,
        name,
        kind: Some(kind.label().into()),
        fields,
        ..Default::default()
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Vec<DocNode> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn decodes_nested_tree_with_task_array() {
        let clients = doc(json!([{
            "id": "c1", "name": "C", "type": "client", "strategicFocus": "Growth",
            "children": [{
                "id": "pg1", "name": "P", "type": "program",
                "children": [{
                    "id": "x", "name": "X", "type": "project", "brief": "b", "status": "Active",
                    "children": [{ "id": "n1", "name": "Alice", "type": "person", "personId": "p1" }],
                    "tasks": [{ "id": "t1", "name": "Deck", "startDate": "2025-10-20", "endDate": "2025-10-24" }]
                }]
            }]
        }]));
        let tree = decode_tree(&clients).unwrap();
        let project = tree.find_project("x").unwrap();
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.people[0].person_id, "p1");
        assert_eq!(project.tasks[0].project_id, "x");
        assert_eq!(tree.clients[0].strategic_focus, "Growth");
    }

    #[test]
    fn rejects_unknown_type_tag() {
        let clients = doc(json!([{ "id": "c1", "name": "C", "type": "planet" }]));
        let err = decode_tree(&clients).unwrap_err();
        assert!(matches!(err, ModelError::MalformedTree { ref path, .. } if path == "clients[0]"));
    }

    #[test]
    fn rejects_person_without_person_id() {
        let clients = doc(json!([{
            "id": "c1", "name": "C", "type": "client",
            "children": [{ "id": "pg", "name": "P", "type": "program",
                "children": [{ "id": "x", "name": "X", "type": "project",
                    "children": [{ "id": "n1", "name": "Nobody", "type": "person" }] }] }]
        }]));
        let err = decode_tree(&clients).unwrap_err();
        assert_eq!(
            err,
            ModelError::malformed(
                "clients[0]/children[0]/children[0]/children[0]",
                "person node has no personId"
            )
        );
    }

    #[test]
    fn rejects_allocation_above_full_time() {
        let person = |allocation: u64| {
            doc(json!([{
                "id": "c1", "name": "C", "type": "client",
                "children": [{ "id": "pg", "name": "P", "type": "program",
                    "children": [{ "id": "x", "name": "X", "type": "project",
                        "children": [{ "id": "n1", "name": "Alice", "type": "person", "personId": "p1",
                            "assignments": [{ "projectId": "x", "allocation": allocation,
                                "startDate": "2025-10-01", "endDate": "2025-10-31" }] }] }] }]
            }]))
        };
        assert!(decode_tree(&person(100)).is_ok());
        let err = decode_tree(&person(150)).unwrap_err();
        assert!(matches!(err, ModelError::MalformedTree { ref reason, .. } if reason.contains("150%")));
    }

    #[test]
    fn rejects_program_directly_under_program() {
        let clients = doc(json!([{
            "id": "c1", "name": "C", "type": "client",
            "children": [{ "id": "pg", "name": "P", "type": "program",
                "children": [{ "id": "pg2", "name": "Nested", "type": "program" }] }]
        }]));
        assert!(decode_tree(&clients).is_err());
    }

    #[test]
    fn encoding_keeps_ids_and_tags() {
        let clients = doc(json!([{
            "id": "c1", "name": "C", "type": "client",
            "children": [{ "id": "pg", "name": "P", "type": "program",
                "children": [{ "id": "x", "name": "X", "type": "project",
                    "children": [{ "id": "n1", "name": "Alice", "type": "person", "personId": "p1",
                        "tags": [{ "type": "Skill", "value": "Design" }] }] }] }]
        }]));
        let tree = decode_tree(&clients).unwrap();
        let encoded = encode_tree(&tree);
        assert_eq!(decode_tree(&encoded).unwrap(), tree);
        let person = &encoded[0].children[0].children[0].children[0];
        assert_eq!(person.kind.as_deref(), Some("person"));
        assert_eq!(person.fields["tags"][0]["value"], "Design");
    }
}
