use std::collections::HashMap;

use egui::{Color32, Pos2, RichText, Stroke, Ui};
use egui_phosphor::regular as icons;

use workhub::model::{Client, NodeKind, Person, Program, Project, Tag};
use workhub::selection::{compute_connections, Selection};

use crate::app::WorkHubApp;
use crate::ui::dialogs::AddDialog;
use crate::ui::theme;

const PROJECT_CARD_WIDTH: f32 = 230.0;

/// Something the user did while the tree was being drawn. Applied once the
/// frame is done so drawing only needs shared access to the app.
enum OrgEvent {
    Toggle(String),
    Select(Selection),
    OpenPerson(String),
    OpenHub(String),
    Delete(String, NodeKind),
    Add(AddDialog),
}

/// Render the client → program → project hierarchy with affinity curves
/// between highlighted projects.
pub fn show_org_chart(app: &mut WorkHubApp, ui: &mut Ui) {
    let mut events = Vec::new();
    let mut positions: HashMap<String, Pos2> = HashMap::new();

    if app.workspace.tree.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(RichText::new("No clients yet").color(theme::TEXT_DIM));
            if ui.button(format!("{}  Add Client", icons::PLUS)).clicked() {
                events.push(OrgEvent::Add(AddDialog::client()));
            }
        });
    }

    let visible = app.visible_tree();
    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for client in &visible.clients {
                show_client(app, client, &mut events, &mut positions, ui);
                ui.add_space(10.0);
            }

            let painter = ui.painter();
            for curve in compute_connections(&app.highlighted, &positions) {
                painter.add(egui::epaint::QuadraticBezierShape::from_points_stroke(
                    [curve.from, curve.control, curve.to],
                    false,
                    Color32::TRANSPARENT,
                    Stroke::new(2.0, theme::CURVE),
                ));
                for end in [curve.from, curve.to] {
                    painter.circle_filled(end, 3.5, theme::BORDER_ACCENT);
                }
            }
        });

    for event in events {
        match event {
            OrgEvent::Toggle(id) => {
                if !app.collapsed.remove(&id) {
                    app.collapsed.insert(id);
                }
            }
            OrgEvent::Select(selection) => app.select(selection),
            OrgEvent::OpenPerson(pid) => app.open_person(&pid),
            OrgEvent::OpenHub(id) => app.open_hub(&id),
            OrgEvent::Delete(id, kind) => app.delete_node(&id, kind),
            OrgEvent::Add(dialog) => app.add_dialog = Some(dialog),
        }
    }
}

/// Caret button; returns true while the node is expanded.
fn expander(app: &WorkHubApp, id: &str, events: &mut Vec<OrgEvent>, ui: &mut Ui) -> bool {
    let open = !app.collapsed.contains(id);
    let caret = if open { icons::CARET_DOWN } else { icons::CARET_RIGHT };
    if ui.add(egui::Button::new(caret).frame(false)).clicked() {
        events.push(OrgEvent::Toggle(id.to_string()));
    }
    open
}

fn delete_button(id: &str, kind: NodeKind, events: &mut Vec<OrgEvent>, ui: &mut Ui) {
    if ui
        .add(egui::Button::new(RichText::new(icons::TRASH).color(theme::TEXT_DIM)).frame(false))
        .on_hover_text(format!("Delete {kind}"))
        .clicked()
    {
        events.push(OrgEvent::Delete(id.to_string(), kind));
    }
}

fn show_client(
    app: &WorkHubApp,
    client: &Client,
    events: &mut Vec<OrgEvent>,
    positions: &mut HashMap<String, Pos2>,
    ui: &mut Ui,
) {
    egui::Frame::default()
        .fill(theme::BG_PANEL)
        .stroke(Stroke::new(1.0, theme::BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            let open = ui
                .horizontal(|ui| {
                    let open = expander(app, &client.id, events, ui);
                    ui.label(
                        RichText::new(format!("{}  {}", icons::BUILDINGS, client.name))
                            .font(theme::font_header())
                            .color(theme::TEXT_PRIMARY),
                    );
                    if !client.strategic_focus.is_empty() {
                        ui.label(RichText::new(&client.strategic_focus).color(theme::TEXT_SECONDARY));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        delete_button(&client.id, NodeKind::Client, events, ui);
                        if ui.small_button(format!("{} Program", icons::PLUS)).clicked() {
                            events.push(OrgEvent::Add(AddDialog::program(&client.id)));
                        }
                    });
                    open
                })
                .inner;
            if !open {
                return;
            }
            for program in &client.programs {
                ui.add_space(6.0);
                ui.indent(&program.id, |ui| {
                    show_program(app, program, events, positions, ui);
                });
            }
        });
}

fn show_program(
    app: &WorkHubApp,
    program: &Program,
    events: &mut Vec<OrgEvent>,
    positions: &mut HashMap<String, Pos2>,
    ui: &mut Ui,
) {
    let open = ui
        .horizontal(|ui| {
            let open = expander(app, &program.id, events, ui);
            ui.label(
                RichText::new(format!("{}  {}", icons::FOLDER, program.name))
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );
            ui.label(
                RichText::new(format!("{} projects", program.projects.len()))
                    .font(theme::font_small())
                    .color(theme::TEXT_DIM),
            );
            if ui.small_button(format!("{} Project", icons::PLUS)).clicked() {
                events.push(OrgEvent::Add(AddDialog::project(&program.id)));
            }
            delete_button(&program.id, NodeKind::Program, events, ui);
            open
        })
        .inner;
    if !open {
        return;
    }
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
        for project in &program.projects {
            let rect = show_project_card(app, project, events, ui);
            positions.insert(project.id.clone(), rect.center_top());
        }
    });
}

fn show_project_card(
    app: &WorkHubApp,
    project: &Project,
    events: &mut Vec<OrgEvent>,
    ui: &mut Ui,
) -> egui::Rect {
    let highlighted = app.highlighted.contains(&project.id);
    let (fill, stroke) = if highlighted {
        (theme::BG_HIGHLIGHT, Stroke::new(2.0, theme::BORDER_ACCENT))
    } else {
        (theme::BG_CARD, Stroke::new(1.0, theme::BORDER_SUBTLE))
    };

    egui::Frame::default()
        .fill(fill)
        .stroke(stroke)
        .rounding(6.0)
        .inner_margin(egui::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_width(PROJECT_CARD_WIDTH);
            ui.horizontal(|ui| {
                let title = egui::Button::new(
                    RichText::new(&project.name).strong().color(theme::TEXT_PRIMARY),
                )
                .frame(false);
                if ui.add(title).on_hover_text("Open project hub").clicked() {
                    events.push(OrgEvent::OpenHub(project.id.clone()));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    delete_button(&project.id, NodeKind::Project, events, ui);
                    status_chip(ui, project.status.label(), theme::project_status_color(project.status));
                });
            });
            if let Some(budget) = project.budget {
                ui.label(
                    RichText::new(format!("Budget {budget:.0}"))
                        .font(theme::font_small())
                        .color(theme::TEXT_DIM),
                );
            }
            ui.add_space(4.0);

            for person in &project.people {
                show_person_row(app, person, events, ui);
            }

            ui.add_space(2.0);
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("{} tasks", project.tasks.len()))
                        .font(theme::font_small())
                        .color(theme::TEXT_DIM),
                );
                if ui.small_button(format!("{} Person", icons::PLUS)).clicked() {
                    events.push(OrgEvent::Add(AddDialog::person(&project.id)));
                }
                if ui.small_button(format!("{} Task", icons::PLUS)).clicked() {
                    events.push(OrgEvent::Add(AddDialog::task(&project.id)));
                }
            });
        })
        .response
        .rect
}

fn show_person_row(app: &WorkHubApp, person: &Person, events: &mut Vec<OrgEvent>, ui: &mut Ui) {
    let selected = app.highlight.selection == Selection::Person(person.person_id.clone());
    ui.horizontal_wrapped(|ui| {
        let color = if selected { theme::BORDER_ACCENT } else { theme::TEXT_PRIMARY };
        let name = egui::Button::new(
            RichText::new(format!("{} {}", icons::USER, person.name)).color(color),
        )
        .frame(false);
        if ui.add(name).on_hover_text(&person.role).clicked() {
            events.push(OrgEvent::OpenPerson(person.person_id.clone()));
        }
        if person.ooo.is_some() {
            ui.label(RichText::new("OOO").font(theme::font_small()).color(theme::WARNING));
        }
        for tag in &person.tags {
            if tag_chip(app, tag, ui) {
                events.push(OrgEvent::Select(Selection::tag(tag.tag_type.clone(), &tag.value)));
            }
        }
        delete_button(&person.id, NodeKind::Person, events, ui);
    });
}

/// Clickable tag chip. Returns true when clicked.
pub fn tag_chip(app: &WorkHubApp, tag: &Tag, ui: &mut Ui) -> bool {
    let active = app.highlight.selection == Selection::tag(tag.tag_type.clone(), &tag.value);
    let base = theme::tag_color(&tag.tag_type);
    let fill = if active { base } else { base.gamma_multiply(0.3) };
    ui.add(
        egui::Button::new(RichText::new(&tag.value).font(theme::font_small()).color(theme::TEXT_PRIMARY))
            .fill(fill)
            .rounding(8.0)
            .small(),
    )
    .on_hover_text(format!("{}: {}", tag.tag_type, tag.value))
    .clicked()
}

fn status_chip(ui: &mut Ui, label: &str, color: Color32) {
    egui::Frame::default()
        .fill(color.gamma_multiply(0.3))
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(6.0, 1.0))
        .show(ui, |ui| {
            ui.label(RichText::new(label).font(theme::font_small()).color(color));
        });
}
