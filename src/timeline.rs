//! Shared coordinate system for horizontal task bars.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::index::Indexes;
use crate::model::{Assignee, Group, Task};

/// Gap left between adjacent bars.
pub const BAR_PADDING_PX: f32 = 4.0;

/// Columns shown when there is nothing to lay out.
const EMPTY_SPAN_UNITS: i64 = 14;

/// Time bucket size of the timeline grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Day => "Days",
            Granularity::Week => "Weeks",
            Granularity::Month => "Months",
        }
    }

    /// Column width in pixels.
    pub fn unit_width_px(self) -> f32 {
        match self {
            Granularity::Day => 40.0,
            Granularity::Week => 64.0,
            Granularity::Month => 120.0,
        }
    }

    /// Empty columns kept before the first and after the last task.
    fn margin_units(self) -> i64 {
        match self {
            Granularity::Day => 2,
            Granularity::Week | Granularity::Month => 0,
        }
    }

    /// Start of the unit containing `date`.
    pub fn snap(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => dates::start_of_week(date),
            Granularity::Month => dates::start_of_month(date),
        }
    }

    /// Whole units from the unit containing `a` to the unit containing `b`.
    pub fn units_between(self, a: NaiveDate, b: NaiveDate) -> i64 {
        match self {
            Granularity::Day => dates::days_between(a, b),
            Granularity::Week => dates::weeks_between(a, b),
            Granularity::Month => dates::months_between(a, b),
        }
    }

    pub fn add_units(self, date: NaiveDate, n: i64) -> NaiveDate {
        match self {
            Granularity::Day => date + Duration::days(n),
            Granularity::Week => date + Duration::weeks(n),
            Granularity::Month => dates::add_months(date, n),
        }
    }
}

/// Horizontal placement of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub task_id: String,
    pub left_px: f32,
    pub width_px: f32,
}

impl Bar {
    pub fn right_px(&self) -> f32 {
        self.left_px + self.width_px
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub granularity: Granularity,
    /// Start of the first column.
    pub origin_date: NaiveDate,
    pub unit_count: i64,
    pub unit_width_px: f32,
    pub bars: Vec<Bar>,
}

impl TimelineLayout {
    pub fn total_width_px(&self) -> f32 {
        self.unit_count as f32 * self.unit_width_px
    }

    /// First date of every column, left to right.
    pub fn columns(&self) -> Vec<NaiveDate> {
        (0..self.unit_count)
            .map(|i| self.granularity.add_units(self.origin_date, i))
            .collect()
    }

    /// Left edge of the column containing `date`.
    pub fn x_for(&self, date: NaiveDate) -> f32 {
        self.granularity.units_between(self.origin_date, date) as f32 * self.unit_width_px
    }

    pub fn bar(&self, task_id: &str) -> Option<&Bar> {
        self.bars.iter().find(|b| b.task_id == task_id)
    }
}

/// Lay out `tasks` on a grid anchored at today when the list is empty.
pub fn layout_timeline<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    granularity: Granularity,
) -> TimelineLayout {
    layout_timeline_at(tasks, granularity, chrono::Local::now().date_naive())
}

/// As [`layout_timeline`], with "today" supplied by the caller.
pub fn layout_timeline_at<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    granularity: Granularity,
    today: NaiveDate,
) -> TimelineLayout {
    let tasks: Vec<&Task> = tasks.into_iter().collect();
    let g = granularity;
    let unit_width_px = g.unit_width_px();

    let span = tasks
        .iter()
        .map(|t| t.start_date)
        .min()
        .zip(tasks.iter().map(|t| t.end_date.max(t.start_date)).max());
    let (first, last) = span.unwrap_or((today, g.add_units(today, EMPTY_SPAN_UNITS - 1)));

    let origin_date = g.add_units(g.snap(first), -g.margin_units());
    let unit_count = g.units_between(origin_date, last) + 1 + g.margin_units();

    let bars = tasks
        .iter()
        .filter_map(|task| {
            let units = g
                .units_between(task.start_date, g.add_units(task.end_date, 1))
                .max(1);
            let width_px = units as f32 * unit_width_px - BAR_PADDING_PX;
            if width_px < 0.0 {
                return None;
            }
            Some(Bar {
                task_id: task.id.clone(),
                left_px: g.units_between(origin_date, task.start_date) as f32 * unit_width_px,
                width_px,
            })
        })
        .collect();

    TimelineLayout {
        granularity,
        origin_date,
        unit_count,
        unit_width_px,
        bars,
    }
}

/// Who a resource row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RowOwner {
    Person(String),
    Group(String),
    Unassigned,
}

/// One row of the resource view: an assignee and the bars of their tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRow {
    pub owner: RowOwner,
    pub label: String,
    pub bars: Vec<Bar>,
}

/// Group the bars of `layout` by task assignee. Rows are sorted by label,
/// with unassigned work last.
pub fn resource_rows<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    layout: &TimelineLayout,
    indexes: &Indexes,
    groups: &[std::sync::Arc<Group>],
) -> Vec<ResourceRow> {
    let mut rows: BTreeMap<RowOwner, Vec<Bar>> = BTreeMap::new();
    for task in tasks {
        let Some(bar) = layout.bar(&task.id) else {
            continue;
        };
        let owner = match task.assignee() {
            Some(Assignee::Person(pid)) => RowOwner::Person(pid.to_string()),
            Some(Assignee::Group(gid)) => RowOwner::Group(gid.to_string()),
            None => RowOwner::Unassigned,
        };
        rows.entry(owner).or_default().push(bar.clone());
    }

    let mut out: Vec<ResourceRow> = rows
        .into_iter()
        .map(|(owner, bars)| {
            let label = match &owner {
                RowOwner::Person(pid) => indexes
                    .person(pid)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| pid.clone()),
                RowOwner::Group(gid) => groups
                    .iter()
                    .find(|g| g.id == *gid)
                    .map(|g| g.name.clone())
                    .unwrap_or_else(|| gid.clone()),
                RowOwner::Unassigned => "Unassigned".to_string(),
            };
            ResourceRow { owner, label, bars }
        })
        .collect();
    out.sort_by(|a, b| {
        (a.owner == RowOwner::Unassigned)
            .cmp(&(b.owner == RowOwner::Unassigned))
            .then_with(|| a.label.cmp(&b.label))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: &str, start: NaiveDate, end: NaiveDate) -> Task {
        Task::new(id, "proj", id, start, end)
    }

    #[test]
    fn day_origin_is_padded_by_two_days() {
        let t = task("t", d(2025, 10, 1), d(2025, 10, 5));
        let layout = layout_timeline_at([&t], Granularity::Day, d(2000, 1, 1));
        assert_eq!(layout.origin_date, d(2025, 9, 29));
        assert_eq!(layout.unit_count, 9);
        assert_eq!(layout.bars[0].left_px, 80.0);
    }

    #[test]
    fn week_origin_snaps_to_monday() {
        let t = task("t", d(2025, 10, 1), d(2025, 10, 8));
        let layout = layout_timeline_at([&t], Granularity::Week, d(2000, 1, 1));
        assert_eq!(layout.origin_date, d(2025, 9, 29));
        assert_eq!(layout.unit_count, 2);
        assert_eq!(layout.bars[0].width_px, 2.0 * 64.0 - BAR_PADDING_PX);
    }

    #[test]
    fn months_are_equal_width_columns() {
        let feb = task("feb", d(2025, 2, 1), d(2025, 2, 28));
        let mar = task("mar", d(2025, 3, 1), d(2025, 3, 31));
        let layout = layout_timeline_at([&feb, &mar], Granularity::Month, d(2000, 1, 1));
        assert_eq!(layout.origin_date, d(2025, 2, 1));
        assert_eq!(layout.unit_count, 2);
        assert_eq!(layout.bars[0].width_px, layout.bars[1].width_px);
        assert_eq!(layout.bars[1].left_px, 120.0);
    }

    #[test]
    fn empty_list_anchors_at_today() {
        let today = d(2026, 3, 18);
        let layout = layout_timeline_at(std::iter::empty(), Granularity::Day, today);
        assert!(layout.bars.is_empty());
        assert_eq!(layout.origin_date, d(2026, 3, 16));
        assert_eq!(layout.unit_count, EMPTY_SPAN_UNITS + 4);

        let monthly = layout_timeline_at(std::iter::empty(), Granularity::Month, today);
        assert_eq!(monthly.origin_date, d(2026, 3, 1));
        assert_eq!(monthly.columns().len() as i64, EMPTY_SPAN_UNITS);
    }
}
