pub mod document;
pub mod group;
pub mod node;
pub mod tree;

pub use document::{DocNode, WorkspaceDocument};
pub use group::Group;
pub use node::{
    Assignee, Assignment, Client, Comment, NodeKind, NodeRef, Person, Program, Project,
    ProjectStatus, ResourceType, Tag, TagType, Task, TaskStatus,
};
pub use tree::{Location, WorkTree, Workspace};
