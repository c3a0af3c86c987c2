use std::path::Path;

use tracing::info;

use crate::index::Indexes;
use crate::model::{Assignee, Group, Task};

/// Export tasks to a semicolon-delimited CSV file.
///
/// Columns: Task ; Assignee ; Start Date ; End Date ; Status ; Estimated Hours.
/// Dates are ISO formatted. Returns the number of tasks written.
pub fn export_tasks(
    tasks: &[&Task],
    indexes: &Indexes,
    groups: &[std::sync::Arc<Group>],
    path: &Path,
) -> Result<usize, csv::Error> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    wtr.write_record(["Task", "Assignee", "Start Date", "End Date", "Status", "Estimated Hours"])?;
    for task in tasks {
        let assignee = match task.assignee() {
            Some(Assignee::Person(pid)) => indexes
                .person(pid)
                .map_or_else(|| pid.to_string(), |p| p.name.clone()),
            Some(Assignee::Group(gid)) => groups
                .iter()
                .find(|g| g.id == gid)
                .map_or_else(|| gid.to_string(), |g| g.name.clone()),
            None => String::new(),
        };
        let start = crate::dates::format_iso(task.start_date);
        let end = crate::dates::format_iso(task.end_date);
        let hours = task.estimated_hours.to_string();
        wtr.write_record([
            task.name.as_str(),
            assignee.as_str(),
            start.as_str(),
            end.as_str(),
            task.status.label(),
            hours.as_str(),
        ])?;
    }
    wtr.flush()?;
    info!(path = %path.display(), count = tasks.len(), "exported tasks");
    Ok(tasks.len())
}
