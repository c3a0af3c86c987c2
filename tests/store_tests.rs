//! Integration tests for the JSON document store, the rate-card importer and
//! the task exporter. Each test works in its own temporary directory.

mod common;

use common::small_workspace;
use tempfile::TempDir;
use workhub::io::csv_export::export_tasks;
use workhub::io::csv_import::{import_rates, placeholder_people, RateTable};
use workhub::model::{TaskStatus, Workspace};
use workhub::reducer::SequentialIds;
use workhub::store::{DocumentStore, JsonFileStore};
use workhub::{build_indexes, ImportError, StoreError};

fn setup_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

mod document_store {
    use super::*;

    #[test]
    fn workspace_survives_save_and_load() {
        let dir = setup_dir();
        let store = JsonFileStore::new(dir.path().join("nested").join("workspace.json"));
        let ws = small_workspace();

        store.save_workspace(&ws).expect("save should succeed");
        let loaded = store.load_workspace().expect("load should succeed");
        assert_eq!(loaded, ws);
    }

    #[test]
    fn sample_workspace_survives_save_and_load() {
        let dir = setup_dir();
        let store = JsonFileStore::new(dir.path().join("sample.json"));
        let ws = workhub::seed::sample_workspace();

        store.save_workspace(&ws).expect("save should succeed");
        assert_eq!(store.load_workspace().expect("load should succeed"), ws);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = setup_dir();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(!store.exists());
        assert_eq!(store.load_workspace().unwrap(), Workspace::default());
    }

    #[test]
    fn saving_groups_keeps_the_tree() {
        let dir = setup_dir();
        let store = JsonFileStore::new(dir.path().join("workspace.json"));
        let ws = small_workspace();
        store.save_workspace(&ws).unwrap();

        store.save_groups(&[]).unwrap();
        let loaded = store.load_workspace().unwrap();
        assert_eq!(loaded.tree, ws.tree);
        assert!(loaded.groups.is_empty());
    }

    #[test]
    fn malformed_document_is_reported() {
        let dir = setup_dir();
        let path = dir.path().join("broken.json");
        std::fs::write(
            &path,
            r#"{ "version": 1, "clients": [{ "id": "c", "name": "C", "type": "galaxy" }] }"#,
        )
        .unwrap();
        let err = JsonFileStore::new(&path).load_workspace().unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)), "got {err:?}");

        std::fs::write(&path, "not json").unwrap();
        let err = JsonFileStore::new(&path).load_workspace().unwrap_err();
        assert!(matches!(err, StoreError::Json(_)), "got {err:?}");
    }
}

mod rate_cards {
    use super::*;

    const CARD: &str = "Rate card FY26\n\
                        Role,Region,Category,Rate Low,Rate High,Estimated Cost\n\
                        Designer,UK,Creative,50,80,9000\n\
                        Designer,US,Creative,60,95,11000\n\
                        Strategist,UK,Strategy,70,120,12500\n";

    #[test]
    fn imported_card_persists_and_seeds_people() {
        let dir = setup_dir();
        let card = dir.path().join("card.csv");
        std::fs::write(&card, CARD).unwrap();

        let import = import_rates(&card).expect("import should succeed");
        assert_eq!(import.rows.len(), 3);
        assert_eq!(import.skipped, 0);

        let mut table = RateTable::default();
        assert_eq!(table.upsert(import.rows), 3);
        let saved = dir.path().join("rates.json");
        table.save_to(&saved).unwrap();
        let reloaded = RateTable::load_from(&saved).unwrap();
        assert_eq!(reloaded.lookup("Designer", "US").unwrap().rate_high, 95.0);

        let people = placeholder_people(reloaded.rows(), 2, &mut SequentialIds::default());
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].monthly_cost, Some(9000.0));
        assert_eq!(people[0].billable_rate, Some(80.0));
    }

    #[test]
    fn card_without_rows_is_rejected() {
        let dir = setup_dir();
        let card = dir.path().join("empty.csv");
        std::fs::write(&card, "Role,Region\n,UK\n").unwrap();
        let err = import_rates(&card).unwrap_err();
        assert!(matches!(err, ImportError::NoRows(1)), "got {err:?}");
    }
}

mod task_export {
    use super::*;

    #[test]
    fn exports_one_line_per_task_with_assignee_names() {
        let dir = setup_dir();
        let path = dir.path().join("tasks.csv");
        let mut ws = small_workspace();
        ws = workhub::apply(
            &ws,
            workhub::Action::UpdateTask(workhub::reducer::TaskPatch {
                assignee_id: Some("p-bob".into()),
                status: Some(TaskStatus::InProgress),
                ..workhub::reducer::TaskPatch::new("task-a")
            }),
            &mut SequentialIds::default(),
        );
        let idx = build_indexes(&ws.tree).unwrap();
        let tasks: Vec<_> = ws.tree.tasks().collect();

        let count = export_tasks(&tasks, &idx, &ws.groups, &path).unwrap();
        assert_eq!(count, 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Task;Assignee;Start Date;End Date;Status;Estimated Hours"
        );
        assert_eq!(lines[1], "Moodboard;Bob;2025-10-06;2025-10-10;In Progress;0");
    }
}
