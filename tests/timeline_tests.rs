//! Integration tests for timeline layout and resource rows.

mod common;

use common::{d, small_workspace};
use workhub::model::Task;
use workhub::timeline::{layout_timeline_at, resource_rows, RowOwner, BAR_PADDING_PX};
use workhub::{build_indexes, Granularity};

#[test]
fn bars_share_one_coordinate_system() {
    let a = Task::new("a", "x", "A", d(2025, 10, 6), d(2025, 10, 10));
    let b = Task::new("b", "x", "B", d(2025, 10, 8), d(2025, 10, 8));
    let layout = layout_timeline_at([&a, &b], Granularity::Day, d(2000, 1, 1));

    assert_eq!(layout.origin_date, d(2025, 10, 4));
    let bar_a = layout.bar("a").unwrap();
    let bar_b = layout.bar("b").unwrap();
    assert_eq!(bar_a.left_px, 2.0 * 40.0);
    assert_eq!(bar_a.width_px, 5.0 * 40.0 - BAR_PADDING_PX);
    assert_eq!(bar_b.left_px, 4.0 * 40.0);
    assert_eq!(bar_b.width_px, 40.0 - BAR_PADDING_PX);
    assert_eq!(layout.x_for(d(2025, 10, 8)), bar_b.left_px);
    assert!(layout.total_width_px() >= bar_a.right_px());
}

#[test]
fn every_granularity_covers_every_task() {
    let a = Task::new("a", "x", "A", d(2025, 1, 30), d(2025, 2, 2));
    let b = Task::new("b", "x", "B", d(2025, 4, 14), d(2025, 5, 20));
    for g in Granularity::ALL {
        let layout = layout_timeline_at([&a, &b], g, d(2000, 1, 1));
        assert_eq!(layout.bars.len(), 2, "{g:?}");
        for bar in &layout.bars {
            assert!(bar.left_px >= 0.0, "{g:?}");
            assert!(bar.right_px() <= layout.total_width_px(), "{g:?}");
        }
    }
}

#[test]
fn resource_rows_group_by_assignee_with_unassigned_last() {
    let ws = small_workspace();
    let idx = build_indexes(&ws.tree).unwrap();

    let mut by_bob = Task::new("t1", "proj-a", "Edit", d(2025, 10, 6), d(2025, 10, 7));
    by_bob.assign_person("p-bob");
    let mut by_alice = Task::new("t2", "proj-a", "Draw", d(2025, 10, 6), d(2025, 10, 9));
    by_alice.assign_person("p-alice");
    let mut by_ops = Task::new("t3", "proj-b", "Ship", d(2025, 10, 8), d(2025, 10, 9));
    by_ops.assign_group("group-ops");
    let loose = Task::new("t4", "proj-b", "Tidy", d(2025, 10, 8), d(2025, 10, 8));
    let mut also_bob = Task::new("t5", "proj-b", "Print", d(2025, 10, 10), d(2025, 10, 10));
    also_bob.assign_person("p-bob");

    let tasks = [&by_bob, &by_alice, &by_ops, &loose, &also_bob];
    let layout = layout_timeline_at(tasks, Granularity::Day, d(2000, 1, 1));
    let rows = resource_rows(tasks, &layout, &idx, &ws.groups);

    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["Alice", "Bob", "Ops", "Unassigned"]);
    assert_eq!(rows[1].owner, RowOwner::Person("p-bob".into()));
    assert_eq!(rows[1].bars.len(), 2);
    assert_eq!(rows[2].owner, RowOwner::Group("group-ops".into()));
    assert_eq!(rows[3].owner, RowOwner::Unassigned);
}
