//! Integration tests for the workspace reducer: purity, structural sharing,
//! and the behavior of each edit.

mod common;

use std::sync::Arc;

use common::{d, small_workspace};
use serde_json::json;
use workhub::model::{
    Assignment, NodeKind, Person, ProjectStatus, ResourceType, Tag, TagType, Task, TaskStatus,
};
use workhub::reducer::{apply, Action, PersonPatch, ProjectPatch, SequentialIds, TaskPatch};
use workhub::{build_indexes, ModelError};

fn run(action: Action) -> (workhub::model::Workspace, workhub::model::Workspace) {
    let before = small_workspace();
    let after = apply(&before, action, &mut SequentialIds::default());
    (before, after)
}

mod purity {
    use super::*;

    #[test]
    fn input_workspace_is_never_modified() {
        let before = small_workspace();
        let snapshot = before.clone();
        let _ = apply(
            &before,
            Action::DeleteNode {
                id: "proj-a".into(),
                kind: NodeKind::Project,
            },
            &mut SequentialIds::default(),
        );
        assert_eq!(before, snapshot);
    }

    #[test]
    fn untouched_subtrees_are_shared() {
        let (before, after) = run(Action::UpdateProject(ProjectPatch {
            status: Some(ProjectStatus::Active),
            ..ProjectPatch::new("proj-a")
        }));
        assert!(!Arc::ptr_eq(&before.tree.clients[0], &after.tree.clients[0]));
        assert!(Arc::ptr_eq(&before.tree.clients[1], &after.tree.clients[1]));
        assert!(Arc::ptr_eq(&before.groups[0], &after.groups[0]));

        // Siblings of the edited project keep their identity too.
        let people_before = &before.tree.find_project("proj-a").unwrap().people;
        let people_after = &after.tree.find_project("proj-a").unwrap().people;
        assert!(Arc::ptr_eq(&people_before[0], &people_after[0]));
    }

    #[test]
    fn unresolved_target_is_a_no_op() {
        let (before, after) = run(Action::UpdateTask(TaskPatch {
            status: Some(TaskStatus::Complete),
            ..TaskPatch::new("no-such-task")
        }));
        assert_eq!(before, after);
    }

    #[test]
    fn delete_with_wrong_kind_is_a_no_op() {
        let (before, after) = run(Action::DeleteNode {
            id: "proj-a".into(),
            kind: NodeKind::Task,
        });
        assert_eq!(before, after);
    }
}

mod edits {
    use super::*;

    #[test]
    fn add_task_fills_missing_id() {
        let task = Task::new("", "proj-b", "Kickoff", d(2025, 11, 3), d(2025, 11, 3));
        let (_, after) = run(Action::AddTask(task));
        let project = after.tree.find_project("proj-b").unwrap();
        assert_eq!(project.tasks.len(), 1);
        assert_eq!(project.tasks[0].id, "task-1");
    }

    #[test]
    fn update_task_rejects_end_before_start() {
        let (before, after) = run(Action::UpdateTask(TaskPatch {
            end_date: Some(d(2025, 10, 1)),
            ..TaskPatch::new("task-a")
        }));
        assert_eq!(before, after);
    }

    #[test]
    fn group_assignment_replaces_person_assignment() {
        let (_, assigned) = run(Action::UpdateTask(TaskPatch {
            assignee_id: Some("p-bob".into()),
            ..TaskPatch::new("task-a")
        }));
        let next = apply(
            &assigned,
            Action::UpdateTask(TaskPatch {
                assignee_group_id: Some("group-ops".into()),
                ..TaskPatch::new("task-a")
            }),
            &mut SequentialIds::default(),
        );
        let task = next.tree.find_task("task-a").unwrap();
        assert_eq!(task.assignee_id, None);
        assert_eq!(task.assignee_group_id.as_deref(), Some("group-ops"));
    }

    #[test]
    fn deleting_a_project_drops_its_people_from_the_index() {
        let (_, after) = run(Action::DeleteNode {
            id: "proj-a".into(),
            kind: NodeKind::Project,
        });
        let idx = build_indexes(&after.tree).unwrap();
        assert!(idx.person("p-bob").is_none());
        assert!(idx.person("p-alice").is_some());
        assert!(after.tree.find_task("task-a").is_none());
    }

    #[test]
    fn assigning_a_group_adds_only_missing_members() {
        let (_, after) = run(Action::AssignGroupToProject {
            group_id: "group-ops".into(),
            project_id: "proj-b".into(),
        });
        let people = &after.tree.find_project("proj-b").unwrap().people;
        assert_eq!(people.len(), 2);
        let newcomer = &people[1];
        assert_eq!(newcomer.person_id, "p-bob");
        assert_eq!(newcomer.role, "Producer");
        assert_eq!(newcomer.id, "person-1");
    }

    #[test]
    fn comments_append_in_order() {
        let before = small_workspace();
        let mut ids = SequentialIds::default();
        let mut ws = before.clone();
        for text in ["first", "second"] {
            ws = apply(
                &ws,
                Action::AddComment {
                    task_id: "task-a".into(),
                    author: "Bob".into(),
                    text: text.into(),
                },
                &mut ids,
            );
        }
        let comments = &ws.tree.find_task("task-a").unwrap().comments;
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert!(before.tree.find_task("task-a").unwrap().comments.is_empty());
    }

    #[test]
    fn removing_a_member_keeps_the_others() {
        let (_, removed) = run(Action::RemovePersonFromGroup {
            group_id: "group-ops".into(),
            person_id: "p-bob".into(),
        });
        let group = removed.find_group("group-ops").unwrap();
        assert!(!group.contains("p-bob"));
        assert!(group.contains("p-alice"));
    }

    #[test]
    fn removing_a_non_member_changes_nothing() {
        let (before, after) = run(Action::RemovePersonFromGroup {
            group_id: "group-ops".into(),
            person_id: "p-carol".into(),
        });
        assert_eq!(before, after);
        assert!(Arc::ptr_eq(&before.groups[0], &after.groups[0]));
    }

    #[test]
    fn add_client_appends_with_trimmed_name() {
        let (before, after) = run(Action::AddClient {
            name: "  Initech ".into(),
            strategic_focus: "Cost".into(),
        });
        assert_eq!(after.tree.clients.len(), 3);
        let client = &after.tree.clients[2];
        assert_eq!(client.id, "client-1");
        assert_eq!(client.name, "Initech");
        assert_eq!(client.strategic_focus, "Cost");
        assert!(client.programs.is_empty());
        assert!(Arc::ptr_eq(&before.tree.clients[0], &after.tree.clients[0]));
    }

    #[test]
    fn add_client_with_blank_name_is_a_no_op() {
        for name in ["", "   "] {
            let (before, after) = run(Action::AddClient {
                name: name.into(),
                strategic_focus: String::new(),
            });
            assert_eq!(before, after, "name {name:?}");
        }
    }

    #[test]
    fn add_program_appends_under_its_client() {
        let (before, after) = run(Action::AddProgram {
            name: "Retention".into(),
            client_id: "client-b".into(),
        });
        let client = after.tree.find_client("client-b").unwrap();
        assert_eq!(client.programs.len(), 2);
        assert_eq!(client.programs[1].id, "prog-1");
        assert_eq!(client.programs[1].name, "Retention");
        assert!(Arc::ptr_eq(&before.tree.clients[0], &after.tree.clients[0]));
    }

    #[test]
    fn add_program_needs_a_client_and_a_name() {
        let cases = [
            ("Retention", "client-missing"),
            ("Retention", "prog-a"),
            (" ", "client-b"),
        ];
        for (name, client_id) in cases {
            let (before, after) = run(Action::AddProgram {
                name: name.into(),
                client_id: client_id.into(),
            });
            assert_eq!(before, after, "{name:?} under {client_id}");
        }
    }

    #[test]
    fn add_project_starts_pending() {
        let (_, after) = run(Action::AddProject {
            name: "Spring Campaign".into(),
            program_id: "prog-b".into(),
            brief: "Seasonal push".into(),
            budget: Some(2500.0),
        });
        let program = &after.tree.clients[1].programs[0];
        assert_eq!(program.projects.len(), 2);
        let project = &program.projects[1];
        assert_eq!(project.id, "proj-1");
        assert_eq!(project.status, ProjectStatus::Pending);
        assert_eq!(project.brief, "Seasonal push");
        assert_eq!(project.budget, Some(2500.0));
        assert!(project.people.is_empty() && project.tasks.is_empty());
    }

    #[test]
    fn add_project_drops_negative_budget() {
        let (_, after) = run(Action::AddProject {
            name: "Overdrawn".into(),
            program_id: "prog-a".into(),
            brief: String::new(),
            budget: Some(-10.0),
        });
        let project = after.tree.find_project("proj-1").unwrap();
        assert_eq!(project.budget, None);
    }

    #[test]
    fn delete_group_removes_only_that_group() {
        let (_, with_leads) = run(Action::AddGroup { name: "Leads".into() });
        let next = apply(
            &with_leads,
            Action::DeleteGroup {
                group_id: "group-ops".into(),
            },
            &mut SequentialIds::default(),
        );
        assert!(next.find_group("group-ops").is_none());
        assert_eq!(next.groups.len(), 1);
        assert_eq!(next.groups[0].name, "Leads");
    }

    #[test]
    fn delete_unknown_group_is_a_no_op() {
        let (before, after) = run(Action::DeleteGroup {
            group_id: "group-missing".into(),
        });
        assert_eq!(before, after);
    }

    #[test]
    fn add_person_appends_assignment_node() {
        let carol = Person::new("", "p-carol", "Carol").with_role("Strategist");
        let (_, after) = run(Action::AddPerson {
            project_id: "proj-b".into(),
            person: carol,
        });
        let people = &after.tree.find_project("proj-b").unwrap().people;
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].id, "person-1");
        assert_eq!(people[1].person_id, "p-carol");
        let idx = build_indexes(&after.tree).unwrap();
        assert_eq!(idx.person("p-carol").unwrap().role, "Strategist");
    }

    #[test]
    fn add_person_without_person_id_is_a_no_op() {
        let (before, after) = run(Action::AddPerson {
            project_id: "proj-b".into(),
            person: Person::new("", "", "Nobody"),
        });
        assert_eq!(before, after);
    }

    #[test]
    fn add_person_rejects_allocation_over_full_time() {
        let mut carol = Person::new("", "p-carol", "Carol");
        carol.assignments.push(Assignment {
            project_id: "proj-b".into(),
            allocation: 150,
            start_date: d(2025, 10, 1),
            end_date: d(2025, 10, 31),
        });
        let (before, after) = run(Action::AddPerson {
            project_id: "proj-b".into(),
            person: carol,
        });
        assert_eq!(before, after);
    }

    #[test]
    fn update_person_rewrites_every_assignment_node() {
        let (before, after) = run(Action::UpdatePerson(PersonPatch {
            role: Some("Art Director".into()),
            tags: Some(vec![Tag::new(TagType::Team, "Studio")]),
            resource_type: Some(ResourceType::Contractor),
            ..PersonPatch::new("p-alice")
        }));
        let alices: Vec<&Person> = after
            .tree
            .people()
            .filter(|p| p.person_id == "p-alice")
            .collect();
        assert_eq!(alices.len(), 2);
        for alice in &alices {
            assert_eq!(alice.role, "Art Director");
            assert_eq!(alice.name, "Alice");
            assert_eq!(alice.tags, vec![Tag::new(TagType::Team, "Studio")]);
            assert_eq!(alice.resource_type, Some(ResourceType::Contractor));
        }
        let node_ids: Vec<&str> = alices.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(node_ids, ["n-alice-a", "n-alice-b"]);

        // Bob shares proj-a with Alice but is untouched.
        let bob_before = &before.tree.find_project("proj-a").unwrap().people[1];
        let bob_after = &after.tree.find_project("proj-a").unwrap().people[1];
        assert!(Arc::ptr_eq(bob_before, bob_after));
    }

    #[test]
    fn update_person_ignores_blank_names_and_unknown_people() {
        let (before, after) = run(Action::UpdatePerson(PersonPatch {
            name: Some("  ".into()),
            ..PersonPatch::new("p-alice")
        }));
        assert_eq!(before, after);

        let (before, after) = run(Action::UpdatePerson(PersonPatch {
            role: Some("Ghost".into()),
            ..PersonPatch::new("p-nobody")
        }));
        assert_eq!(before, after);
    }

    #[test]
    fn update_person_skips_negative_rates() {
        let (_, after) = run(Action::UpdatePerson(PersonPatch {
            monthly_cost: Some(-1.0),
            billable_rate: Some(120.0),
            ..PersonPatch::new("p-bob")
        }));
        let bob = &after.tree.find_project("proj-a").unwrap().people[1];
        assert_eq!(bob.monthly_cost, None);
        assert_eq!(bob.billable_rate, Some(120.0));
    }
}

mod identity {
    use super::*;

    #[test]
    fn task_with_a_taken_id_gets_a_fresh_one() {
        let copy = Task::new("task-a", "proj-b", "Moodboard v2", d(2025, 11, 3), d(2025, 11, 7));
        let (_, after) = run(Action::AddTask(copy));
        let added = &after.tree.find_project("proj-b").unwrap().tasks[0];
        assert_eq!(added.id, "task-1");
        assert_eq!(added.name, "Moodboard v2");

        let deleted = apply(
            &after,
            Action::DeleteNode {
                id: "task-a".into(),
                kind: NodeKind::Task,
            },
            &mut SequentialIds::default(),
        );
        assert!(!deleted.tree.contains_id("task-a"));
        assert!(deleted.tree.contains_id("task-1"));
    }

    #[test]
    fn id_clashes_are_checked_across_node_kinds() {
        let task = Task::new("proj-a", "proj-b", "Shadow", d(2025, 11, 3), d(2025, 11, 3));
        let (_, after) = run(Action::AddTask(task));
        assert_eq!(after.tree.find_project("proj-b").unwrap().tasks[0].id, "task-1");
    }

    #[test]
    fn person_node_with_a_taken_id_gets_a_fresh_one() {
        let (_, after) = run(Action::AddPerson {
            project_id: "proj-b".into(),
            person: common::bob("n-alice-a"),
        });
        let people = &after.tree.find_project("proj-b").unwrap().people;
        assert_eq!(people[1].id, "person-1");

        let mut ids = after.tree.descendant_ids();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total, "node ids must stay unique");
    }
}

mod properties {
    use super::*;

    #[test]
    fn deleted_ids_vanish_from_every_lookup() {
        let (_, after) = run(Action::DeleteNode {
            id: "proj-a".into(),
            kind: NodeKind::Project,
        });
        let idx = build_indexes(&after.tree).unwrap();
        let remaining = after.tree.descendant_ids();
        for id in ["proj-a", "n-alice-a", "n-bob-a", "task-a"] {
            assert!(!remaining.contains(&id), "{id} still in tree");
        }
        assert!(!idx.project_by_id.contains_key("proj-a"));
        assert!(idx.assignments_by_person["p-alice"]
            .iter()
            .all(|n| n != "n-alice-a"));
    }

    #[test]
    fn adding_a_group_member_is_idempotent() {
        let mut ws = small_workspace();
        let mut ids = SequentialIds::default();
        let add = Action::AddPersonToGroup {
            group_id: "group-ops".into(),
            person_id: "p-carol".into(),
        };
        ws = apply(&ws, add.clone(), &mut ids);
        let once = ws.find_group("group-ops").unwrap().members.clone();
        ws = apply(&ws, add, &mut ids);
        assert_eq!(ws.find_group("group-ops").unwrap().members, once);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn add_project_to_missing_program_is_a_no_op() {
        let (before, after) = run(Action::AddProject {
            name: "Orphan".into(),
            program_id: "prog-missing".into(),
            brief: String::new(),
            budget: None,
        });
        assert_eq!(before, after);
    }
}

mod decoding {
    use super::*;

    #[test]
    fn loose_json_round_trips_through_apply() {
        let action = Action::from_json(json!({ "type": "ADD_GROUP", "name": "Leads" })).unwrap();
        let (_, after) = run(action);
        assert_eq!(after.groups.len(), 2);
        assert_eq!(after.groups[1].name, "Leads");
        assert_eq!(after.groups[1].id, "group-1");
    }

    #[test]
    fn update_person_decodes_from_loose_json() {
        let action = Action::from_json(json!({
            "type": "UPDATE_PERSON",
            "personId": "p-bob",
            "email": "bob@example.com",
            "resourceType": "Full-Time"
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::UpdatePerson(PersonPatch {
                email: Some("bob@example.com".into()),
                resource_type: Some(ResourceType::FullTime),
                ..PersonPatch::new("p-bob")
            })
        );
    }

    #[test]
    fn unknown_type_names_the_tag() {
        let err = Action::from_json(json!({ "type": "FLY_TO_MOON" })).unwrap_err();
        assert_eq!(err, ModelError::UnknownAction("FLY_TO_MOON".into()));
    }
}
