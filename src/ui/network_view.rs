use std::collections::HashMap;

use egui::{Color32, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use workhub::model::{NodeKind, NodeRef};
use workhub::views::{network_graph, GraphNode};

use crate::app::WorkHubApp;
use crate::ui::theme;

const RING_SPACING: f32 = 120.0;

fn node_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Client => 16.0,
        NodeKind::Program => 12.0,
        NodeKind::Project => 10.0,
        NodeKind::Person | NodeKind::Task => 6.0,
    }
}

fn node_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Client => theme::ACCENT,
        NodeKind::Program => theme::bar_color(1),
        NodeKind::Project => theme::bar_color(2),
        NodeKind::Person | NodeKind::Task => theme::bar_color(4),
    }
}

/// Place every node on a ring whose radius grows with its depth. Nodes of the
/// same depth are spread evenly in pre-order so siblings stay together.
fn ring_positions(nodes: &[GraphNode], center: Pos2) -> Vec<Pos2> {
    let mut per_depth: HashMap<usize, usize> = HashMap::new();
    for node in nodes {
        *per_depth.entry(node.depth).or_default() += 1;
    }
    let mut seen: HashMap<usize, usize> = HashMap::new();
    nodes
        .iter()
        .map(|node| {
            let count = per_depth.get(&node.depth).copied().unwrap_or(1);
            let slot = seen.entry(node.depth).or_default();
            let i = *slot;
            *slot += 1;
            let radius = if node.depth == 0 && count == 1 {
                0.0
            } else {
                (node.depth as f32 + 0.5) * RING_SPACING
            };
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            center + Vec2::angled(angle) * radius
        })
        .collect()
}

/// Render the hierarchy as a radial node-link diagram.
pub fn show_network(app: &mut WorkHubApp, ui: &mut Ui) {
    let graph = network_graph(&app.visible_tree());
    let max_depth = graph.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    let extent = (max_depth as f32 + 1.0) * RING_SPACING * 2.0 + 80.0;
    let mut clicked: Option<(String, NodeKind)> = None;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let available = ui.available_size();
            let (response, painter) = ui.allocate_painter(
                Vec2::new(extent.max(available.x), extent.max(available.y)),
                Sense::hover(),
            );
            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            let positions = ring_positions(&graph.nodes, response.rect.center());
            let by_id: HashMap<&str, Pos2> = graph
                .nodes
                .iter()
                .zip(&positions)
                .map(|(n, p)| (n.id.as_str(), *p))
                .collect();

            for link in &graph.links {
                if let (Some(a), Some(b)) = (by_id.get(link.source.as_str()), by_id.get(link.target.as_str())) {
                    painter.line_segment([*a, *b], Stroke::new(1.0, theme::GRID_LINE));
                }
            }

            for (node, pos) in graph.nodes.iter().zip(&positions) {
                let radius = node_radius(node.kind);
                let highlighted = node.kind == NodeKind::Project && app.highlighted.contains(&node.id);
                painter.circle_filled(*pos, radius, node_color(node.kind));
                if highlighted {
                    painter.circle_stroke(*pos, radius + 3.0, Stroke::new(2.0, theme::BORDER_ACCENT));
                }
                if node.kind != NodeKind::Person {
                    painter.text(
                        *pos + Vec2::new(0.0, radius + 8.0),
                        egui::Align2::CENTER_CENTER,
                        &node.name,
                        theme::font_small(),
                        theme::TEXT_SECONDARY,
                    );
                }

                let hit = ui.interact(
                    Rect::from_center_size(*pos, Vec2::splat(radius * 2.0 + 4.0)),
                    ui.make_persistent_id(("network-node", &node.id)),
                    Sense::click(),
                );
                if hit.clicked() {
                    clicked = Some((node.id.clone(), node.kind));
                }
                hit.on_hover_text(format!("{} ({})", node.name, node.kind));
            }
        });

    if let Some((id, kind)) = clicked {
        match kind {
            NodeKind::Project => app.open_hub(&id),
            NodeKind::Person => {
                let person_id = match app.workspace.tree.find(&id) {
                    Some(NodeRef::Person(p)) => Some(p.person_id.clone()),
                    _ => None,
                };
                if let Some(pid) = person_id {
                    app.open_person(&pid);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, depth: usize) -> GraphNode {
        GraphNode {
            id: id.into(),
            name: id.into(),
            kind: NodeKind::Project,
            depth,
        }
    }

    #[test]
    fn single_root_sits_at_center() {
        let center = Pos2::new(100.0, 100.0);
        let pos = ring_positions(&[node("c", 0), node("p", 1), node("q", 1)], center);
        assert_eq!(pos[0], center);
        assert!((pos[1].distance(center) - 1.5 * RING_SPACING).abs() < 1e-3);
        assert!((pos[1].distance(pos[2]) - 3.0 * RING_SPACING).abs() < 1e-3);
    }
}
