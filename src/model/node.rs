use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discriminant of a node in the client → program → project → person/task hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Client,
    Program,
    Project,
    Person,
    Task,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Client => "client",
            NodeKind::Program => "program",
            NodeKind::Project => "project",
            NodeKind::Person => "person",
            NodeKind::Task => "task",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(NodeKind::Client),
            "program" => Some(NodeKind::Program),
            "project" => Some(NodeKind::Project),
            "person" => Some(NodeKind::Person),
            "task" => Some(NodeKind::Task),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of a person tag. Unknown categories are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagType {
    Team,
    Skill,
    Location,
    Other(String),
}

impl From<String> for TagType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Team" => TagType::Team,
            "Skill" => TagType::Skill,
            "Location" => TagType::Location,
            _ => TagType::Other(s),
        }
    }
}

impl From<&str> for TagType {
    fn from(s: &str) -> Self {
        TagType::from(s.to_string())
    }
}

impl From<TagType> for String {
    fn from(t: TagType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagType::Team => f.write_str("Team"),
            TagType::Skill => f.write_str("Skill"),
            TagType::Location => f.write_str("Location"),
            TagType::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "type")]
    pub tag_type: TagType,
    pub value: String,
}

impl Tag {
    pub fn new(tag_type: impl Into<TagType>, value: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            value: value.into(),
        }
    }

    /// Exact, case-sensitive match.
    pub fn matches(&self, tag_type: &TagType, value: &str) -> bool {
        self.tag_type == *tag_type && self.value == value
    }
}

/// Upper bound of [`Assignment::allocation`].
pub const MAX_ALLOCATION: u8 = 100;

/// One person's booking on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub project_id: String,
    /// Percent of the person's time, at most [`MAX_ALLOCATION`].
    pub allocation: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Assignment {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "Full-Time")]
    FullTime,
    Contractor,
    Vendor,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::FullTime,
        ResourceType::Contractor,
        ResourceType::Vendor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResourceType::FullTime => "Full-Time",
            ResourceType::Contractor => "Contractor",
            ResourceType::Vendor => "Vendor",
        }
    }
}

/// A person as assigned to one project. The same `person_id` recurs under
/// every project the person works on, each occurrence with its own node `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub id: String,
    pub person_id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ooo: Option<String>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billable_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
}

impl Person {
    pub fn new(
        id: impl Into<String>,
        person_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            person_id: person_id.into(),
            name: name.into(),
            role: String::new(),
            email: String::new(),
            tags: Vec::new(),
            ooo: None,
            assignments: Vec::new(),
            monthly_cost: None,
            billable_rate: None,
            resource_type: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_tag(mut self, tag_type: impl Into<TagType>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(tag_type, value));
        self
    }

    pub fn has_tag(&self, tag_type: &TagType, value: &str) -> bool {
        self.tags.iter().any(|t| t.matches(tag_type, value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Blocked,
    Complete,
}

impl TaskStatus {
    /// Board column order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Complete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Complete => "Complete",
        }
    }

    /// Lenient mapping used by the CSV importer; unknown strings fall back to To Do.
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "in progress" | "in-progress" | "active" | "started" => TaskStatus::InProgress,
            "blocked" | "on hold" => TaskStatus::Blocked,
            "complete" | "completed" | "done" | "finished" => TaskStatus::Complete,
            _ => TaskStatus::ToDo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
}

/// Who a task is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignee<'a> {
    Person(&'a str),
    Group(&'a str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_group_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Inclusive.
    pub start_date: NaiveDate,
    /// Inclusive, never before `start_date`.
    pub end_date: NaiveDate,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            name: name.into(),
            assignee_id: None,
            assignee_group_id: None,
            status: TaskStatus::ToDo,
            start_date,
            end_date: end_date.max(start_date),
            estimated_hours: 0.0,
            comments: Vec::new(),
        }
    }

    /// A person assignment takes precedence over a group assignment.
    pub fn assignee(&self) -> Option<Assignee<'_>> {
        match (&self.assignee_id, &self.assignee_group_id) {
            (Some(p), _) => Some(Assignee::Person(p)),
            (None, Some(g)) => Some(Assignee::Group(g)),
            (None, None) => None,
        }
    }

    pub fn assign_person(&mut self, person_id: impl Into<String>) {
        self.assignee_id = Some(person_id.into());
        self.assignee_group_id = None;
    }

    pub fn assign_group(&mut self, group_id: impl Into<String>) {
        self.assignee_group_id = Some(group_id.into());
        self.assignee_id = None;
    }

    /// Inclusive length in days.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Pending,
    Active,
    #[serde(rename = "On Hold")]
    OnHold,
    Complete,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Pending,
        ProjectStatus::Active,
        ProjectStatus::OnHold,
        ProjectStatus::Complete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::Active => "Active",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Complete => "Complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub brief: String,
    pub budget: Option<f64>,
    pub status: ProjectStatus,
    pub people: Vec<Arc<Person>>,
    pub tasks: Vec<Arc<Task>>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brief: String::new(),
            budget: None,
            status: ProjectStatus::Pending,
            people: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn has_person(&self, person_id: &str) -> bool {
        self.people.iter().any(|p| p.person_id == person_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub projects: Vec<Arc<Project>>,
}

impl Program {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            projects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub strategic_focus: String,
    pub programs: Vec<Arc<Program>>,
}

impl Client {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            strategic_focus: String::new(),
            programs: Vec::new(),
        }
    }
}

/// Borrowed view of any node, used for traversal.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Client(&'a Client),
    Program(&'a Program),
    Project(&'a Project),
    Person(&'a Person),
    Task(&'a Task),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            NodeRef::Client(n) => &n.id,
            NodeRef::Program(n) => &n.id,
            NodeRef::Project(n) => &n.id,
            NodeRef::Person(n) => &n.id,
            NodeRef::Task(n) => &n.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            NodeRef::Client(n) => &n.name,
            NodeRef::Program(n) => &n.name,
            NodeRef::Project(n) => &n.name,
            NodeRef::Person(n) => &n.name,
            NodeRef::Task(n) => &n.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Client(_) => NodeKind::Client,
            NodeRef::Program(_) => NodeKind::Program,
            NodeRef::Project(_) => NodeKind::Project,
            NodeRef::Person(_) => NodeKind::Person,
            NodeRef::Task(_) => NodeKind::Task,
        }
    }

    /// Direct children in display order (people before tasks under a project).
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match self {
            NodeRef::Client(c) => c.programs.iter().map(|p| NodeRef::Program(p)).collect(),
            NodeRef::Program(p) => p.projects.iter().map(|p| NodeRef::Project(p)).collect(),
            NodeRef::Project(p) => p
                .people
                .iter()
                .map(|n| NodeRef::Person(n))
                .chain(p.tasks.iter().map(|t| NodeRef::Task(t)))
                .collect(),
            NodeRef::Person(_) | NodeRef::Task(_) => Vec::new(),
        }
    }

    /// Depth-first, pre-order visit of this node and everything below it.
    pub fn walk(&self, visit: &mut impl FnMut(NodeRef<'a>)) {
        visit(*self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Ids of every node strictly below this one.
    pub fn descendant_ids(&self) -> Vec<&'a str> {
        let mut ids = Vec::new();
        for child in self.children() {
            child.walk(&mut |n| ids.push(n.id()));
        }
        ids
    }
}
