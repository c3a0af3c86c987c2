//! Flat projections of the tree consumed by the board and network views.

use crate::model::{NodeKind, Task, TaskStatus, WorkTree};

/// Tasks grouped by status, one column per [`TaskStatus`] in board order.
/// Columns are present even when empty.
pub fn board_columns<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
) -> Vec<(TaskStatus, Vec<&'a Task>)> {
    let mut columns: Vec<(TaskStatus, Vec<&Task>)> =
        TaskStatus::ALL.iter().map(|s| (*s, Vec::new())).collect();
    for task in tasks {
        if let Some((_, col)) = columns.iter_mut().find(|(s, _)| *s == task.status) {
            col.push(task);
        }
    }
    columns
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    /// Distance from the root; clients are at depth 0.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Every node in pre-order, with one link per parent → child edge.
/// Tasks are left out; the graph shows who works where.
pub fn network_graph(tree: &WorkTree) -> NetworkGraph {
    let mut graph = NetworkGraph::default();
    for root in tree.roots() {
        let mut stack = vec![(root, 0usize, None::<String>)];
        while let Some((node, depth, parent)) = stack.pop() {
            if node.kind() == NodeKind::Task {
                continue;
            }
            let id = node.id().to_string();
            if let Some(source) = parent {
                graph.links.push(GraphLink {
                    source,
                    target: id.clone(),
                });
            }
            graph.nodes.push(GraphNode {
                id: id.clone(),
                name: node.name().to_string(),
                kind: node.kind(),
                depth,
            });
            for child in node.children().into_iter().rev() {
                stack.push((child, depth + 1, Some(id.clone())));
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn board_keeps_fixed_column_order() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut done = Task::new("t1", "x", "Ship", day, day);
        done.status = TaskStatus::Complete;
        let todo = Task::new("t2", "x", "Plan", day, day);

        let columns = board_columns([&done, &todo]);
        let order: Vec<TaskStatus> = columns.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, TaskStatus::ALL.to_vec());
        assert_eq!(columns[0].1[0].id, "t2");
        assert!(columns[1].1.is_empty());
        assert_eq!(columns[3].1[0].id, "t1");
    }
}
