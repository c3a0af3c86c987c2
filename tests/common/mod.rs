//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use workhub::model::{Client, Group, Person, Program, Project, TagType, Task, WorkTree, Workspace};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
}

pub fn alice(node_id: &str) -> Person {
    Person::new(node_id, "p-alice", "Alice")
        .with_role("Designer")
        .with_tag(TagType::Skill, "Design")
        .with_tag(TagType::Team, "Creative")
}

pub fn bob(node_id: &str) -> Person {
    Person::new(node_id, "p-bob", "Bob")
        .with_role("Producer")
        .with_tag(TagType::Team, "Delivery")
}

/// Two clients with one project each. Alice works on both projects, Bob only
/// on `proj-a`, which also holds one task. Group `group-ops` has both people.
pub fn small_workspace() -> Workspace {
    let mut proj_a = Project::new("proj-a", "Rebrand");
    proj_a.people.push(Arc::new(alice("n-alice-a")));
    proj_a.people.push(Arc::new(bob("n-bob-a")));
    proj_a.tasks.push(Arc::new(Task::new(
        "task-a",
        "proj-a",
        "Moodboard",
        d(2025, 10, 6),
        d(2025, 10, 10),
    )));

    let mut proj_b = Project::new("proj-b", "Launch");
    proj_b.people.push(Arc::new(alice("n-alice-b")));

    let mut program_a = Program::new("prog-a", "Brand");
    program_a.projects.push(Arc::new(proj_a));
    let mut program_b = Program::new("prog-b", "Growth");
    program_b.projects.push(Arc::new(proj_b));

    let mut client_a = Client::new("client-a", "Northwind");
    client_a.programs.push(Arc::new(program_a));
    let mut client_b = Client::new("client-b", "Contoso");
    client_b.programs.push(Arc::new(program_b));

    let mut ops = Group::new("group-ops", "Ops");
    ops.add_member("p-alice");
    ops.add_member("p-bob");

    Workspace::new(WorkTree::new(vec![client_a, client_b]), vec![ops])
}
