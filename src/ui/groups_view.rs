use egui::{RichText, Stroke, Ui};
use egui_phosphor::regular as icons;

use workhub::model::Group;
use workhub::reducer::Action;

use crate::app::WorkHubApp;
use crate::ui::dialogs::AddDialog;
use crate::ui::theme;

/// Render the group list with member management.
pub fn show_groups(app: &mut WorkHubApp, ui: &mut Ui) {
    let mut actions: Vec<Action> = Vec::new();
    let mut add_group = false;

    ui.horizontal(|ui| {
        ui.label(RichText::new("Groups").font(theme::font_header()).color(theme::TEXT_PRIMARY));
        if ui.button(format!("{}  New Group", icons::PLUS)).clicked() {
            add_group = true;
        }
    });
    ui.add_space(8.0);

    if app.workspace.groups.is_empty() {
        ui.label(RichText::new("No groups yet").color(theme::TEXT_DIM));
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for group in &app.workspace.groups {
                show_group_card(app, group, &mut actions, ui);
                ui.add_space(8.0);
            }
        });

    if add_group {
        app.add_dialog = Some(AddDialog::group());
    }
    for action in actions {
        app.dispatch(action);
    }
}

fn show_group_card(app: &WorkHubApp, group: &Group, actions: &mut Vec<Action>, ui: &mut Ui) {
    egui::Frame::default()
        .fill(theme::BG_CARD)
        .stroke(Stroke::new(1.0, theme::BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&group.name).strong().color(theme::TEXT_PRIMARY));
                ui.label(
                    RichText::new(format!("{} members", group.members.len()))
                        .font(theme::font_small())
                        .color(theme::TEXT_DIM),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(format!("{} Delete", icons::TRASH)).clicked() {
                        actions.push(Action::DeleteGroup {
                            group_id: group.id.clone(),
                        });
                    }
                });
            });
            ui.add_space(4.0);

            for person_id in &group.members {
                ui.horizontal(|ui| {
                    let name = app
                        .indexes
                        .person(person_id)
                        .map(|p| p.name.as_str())
                        .unwrap_or(person_id.as_str());
                    ui.label(RichText::new(format!("{} {name}", icons::USER)).color(theme::TEXT_SECONDARY));
                    if ui.small_button(icons::X).on_hover_text("Remove from group").clicked() {
                        actions.push(Action::RemovePersonFromGroup {
                            group_id: group.id.clone(),
                            person_id: person_id.clone(),
                        });
                    }
                });
            }

            ui.add_space(4.0);
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt(("group-add-member", &group.id))
                    .selected_text("Add member...")
                    .width(180.0)
                    .show_ui(ui, |ui| {
                        for person in app.indexes.people_sorted() {
                            if group.contains(&person.person_id) {
                                continue;
                            }
                            if ui.selectable_label(false, &person.name).clicked() {
                                actions.push(Action::AddPersonToGroup {
                                    group_id: group.id.clone(),
                                    person_id: person.person_id.clone(),
                                });
                            }
                        }
                    });

                egui::ComboBox::from_id_salt(("group-assign", &group.id))
                    .selected_text("Assign to project...")
                    .width(200.0)
                    .show_ui(ui, |ui| {
                        for project in app.workspace.tree.projects() {
                            if ui.selectable_label(false, &project.name).clicked() {
                                actions.push(Action::AssignGroupToProject {
                                    group_id: group.id.clone(),
                                    project_id: project.id.clone(),
                                });
                            }
                        }
                    });
            });
        });
}
