use std::sync::Arc;

use chrono::Duration;
use egui::{Color32, Context, Id, RichText, Stroke, Ui, Window};
use egui_phosphor::regular as icons;

use workhub::model::{NodeKind, Project, Task, TaskStatus};
use workhub::reducer::{Action, ProjectPatch, TaskPatch};
use workhub::views::board_columns;

use crate::app::WorkHubApp;
use crate::ui::dialogs::AddDialog;
use crate::ui::theme;

const COMMENT_AUTHOR: &str = "You";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum HubTab {
    #[default]
    Overview,
    Tasks,
    Board,
}

enum HubEvent {
    Dispatch(Action),
    Enrich,
    Export,
    Add(AddDialog),
    Close,
}

fn buffer_id(project_id: &str, what: &'static str) -> Id {
    Id::new(("hub", project_id, what))
}

/// Text buffer kept in egui memory between frames, seeded from `initial`.
fn edit_buffer(ctx: &Context, id: Id, initial: &str) -> String {
    ctx.data_mut(|d| d.get_temp::<String>(id))
        .unwrap_or_else(|| initial.to_string())
}

/// Floating window for one project: brief, tasks, board and enrichment.
pub fn show_project_hub(app: &mut WorkHubApp, ctx: &Context) {
    let Some(project_id) = app.hub_project.clone() else {
        return;
    };
    let Some(project) = app.indexes.project_by_id.get(&project_id).map(Arc::clone) else {
        app.close_hub();
        return;
    };

    let tab_id = buffer_id(&project_id, "tab");
    let mut tab: HubTab = ctx.data_mut(|d| d.get_temp(tab_id)).unwrap_or_default();
    let mut events = Vec::new();
    let mut open = true;

    Window::new(RichText::new(&project.name).strong().size(14.0))
        .id(Id::new("project_hub"))
        .open(&mut open)
        .collapsible(false)
        .default_size([560.0, 480.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut tab, HubTab::Overview, "Overview");
                ui.selectable_value(&mut tab, HubTab::Tasks, format!("Tasks ({})", project.tasks.len()));
                ui.selectable_value(&mut tab, HubTab::Board, "Board");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .button(format!("{} Export", icons::DOWNLOAD_SIMPLE))
                        .on_hover_text("Export this project's tasks to CSV")
                        .clicked()
                    {
                        events.push(HubEvent::Export);
                    }
                    if ui.button(format!("{} Task", icons::PLUS)).clicked() {
                        events.push(HubEvent::Add(AddDialog::task(&project.id)));
                    }
                    if ui.button(format!("{} Person", icons::PLUS)).clicked() {
                        events.push(HubEvent::Add(AddDialog::person(&project.id)));
                    }
                });
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match tab {
                    HubTab::Overview => show_overview(app, &project, &mut events, ui),
                    HubTab::Tasks => show_tasks(app, &project, &mut events, ui),
                    HubTab::Board => show_board(&project, ui),
                });
        });

    ctx.data_mut(|d| d.insert_temp(tab_id, tab));
    if !open || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        events.push(HubEvent::Close);
    }

    for event in events {
        match event {
            HubEvent::Dispatch(action) => app.dispatch(action),
            HubEvent::Enrich => app.start_enrichment(&project_id),
            HubEvent::Export => app.export_tasks(Some(&project_id)),
            HubEvent::Add(dialog) => app.add_dialog = Some(dialog),
            HubEvent::Close => app.close_hub(),
        }
    }
}

fn show_overview(app: &WorkHubApp, project: &Project, events: &mut Vec<HubEvent>, ui: &mut Ui) {
    let ctx = ui.ctx().clone();

    ui.horizontal(|ui| {
        ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
        let mut status = project.status;
        egui::ComboBox::from_id_salt(("hub-status", &project.id))
            .selected_text(status.label())
            .show_ui(ui, |ui| {
                for s in workhub::model::ProjectStatus::ALL {
                    ui.selectable_value(&mut status, s, s.label());
                }
            });
        if status != project.status {
            events.push(HubEvent::Dispatch(Action::UpdateProject(ProjectPatch {
                status: Some(status),
                ..ProjectPatch::new(&project.id)
            })));
        }
        if let Some(budget) = project.budget {
            ui.label(RichText::new(format!("Budget {budget:.0}")).color(theme::TEXT_DIM));
        }
    });
    ui.add_space(6.0);

    ui.label(RichText::new("Brief").strong().color(theme::TEXT_PRIMARY));
    let brief_id = buffer_id(&project.id, "brief");
    let mut brief = edit_buffer(&ctx, brief_id, &project.brief);
    ui.add_sized(
        [ui.available_width(), 90.0],
        egui::TextEdit::multiline(&mut brief).hint_text("What is this project about?"),
    );
    ui.horizontal(|ui| {
        let changed = brief != project.brief;
        if ui.add_enabled(changed, egui::Button::new("Save brief")).clicked() {
            events.push(HubEvent::Dispatch(Action::UpdateProject(ProjectPatch {
                brief: Some(brief.clone()),
                ..ProjectPatch::new(&project.id)
            })));
        }
        if changed && ui.button("Revert").clicked() {
            brief = project.brief.clone();
        }

        let busy = app.enrichment.is_busy_for(&project.id);
        let can_enrich = !busy && !project.brief.trim().is_empty();
        let btn = egui::Button::new(
            RichText::new(format!("{} Enrich", icons::SPARKLE)).color(Color32::WHITE),
        )
        .fill(theme::ACCENT)
        .rounding(egui::Rounding::same(4.0));
        if ui
            .add_enabled(can_enrich, btn)
            .on_disabled_hover_text("Needs a saved brief")
            .clicked()
        {
            events.push(HubEvent::Enrich);
        }
        if busy {
            ui.spinner();
        }
    });
    ctx.data_mut(|d| d.insert_temp(brief_id, brief));

    if let Some((for_project, enrichment)) = &app.enrichment_result {
        if *for_project == project.id {
            ui.add_space(8.0);
            egui::Frame::default()
                .fill(theme::BG_CARD)
                .stroke(Stroke::new(1.0, theme::BORDER_ACCENT))
                .rounding(6.0)
                .inner_margin(egui::Margin::same(8.0))
                .show(ui, |ui| {
                    ui.label(RichText::new("Suggested brief").strong().color(theme::TEXT_PRIMARY));
                    ui.label(&enrichment.enriched_brief);
                    if ui.small_button("Apply brief").clicked() {
                        ctx.data_mut(|d| d.remove::<String>(brief_id));
                        events.push(HubEvent::Dispatch(Action::UpdateProject(ProjectPatch {
                            brief: Some(enrichment.enriched_brief.clone()),
                            ..ProjectPatch::new(&project.id)
                        })));
                    }

                    if !enrichment.suggested_tasks.is_empty() {
                        ui.add_space(6.0);
                        ui.label(RichText::new("Suggested tasks").strong().color(theme::TEXT_PRIMARY));
                        let today = chrono::Local::now().date_naive();
                        for name in &enrichment.suggested_tasks {
                            ui.horizontal(|ui| {
                                if ui.small_button(icons::PLUS).on_hover_text("Add task").clicked() {
                                    let task = Task::new("", &project.id, name, today, today + Duration::days(7));
                                    events.push(HubEvent::Dispatch(Action::AddTask(task)));
                                }
                                ui.label(name);
                            });
                        }
                    }

                    if !enrichment.team_recommendations.is_empty() {
                        ui.add_space(6.0);
                        ui.label(RichText::new("Recommended team").strong().color(theme::TEXT_PRIMARY));
                        for rec in &enrichment.team_recommendations {
                            ui.label(
                                RichText::new(format!("{} · {}", rec.name, rec.role))
                                    .color(theme::TEXT_PRIMARY),
                            );
                            if !rec.justification.is_empty() {
                                ui.label(
                                    RichText::new(&rec.justification)
                                        .font(theme::font_small())
                                        .color(theme::TEXT_SECONDARY),
                                );
                            }
                        }
                    }
                });
        }
    }

    ui.add_space(8.0);
    ui.label(RichText::new("Team").strong().color(theme::TEXT_PRIMARY));
    if project.people.is_empty() {
        ui.label(RichText::new("Nobody assigned yet").color(theme::TEXT_DIM));
    }
    for person in &project.people {
        ui.horizontal(|ui| {
            ui.label(format!("{} {}", icons::USER, person.name));
            ui.label(RichText::new(&person.role).color(theme::TEXT_SECONDARY));
        });
    }
}

fn show_tasks(app: &WorkHubApp, project: &Project, events: &mut Vec<HubEvent>, ui: &mut Ui) {
    if project.tasks.is_empty() {
        ui.label(RichText::new("No tasks yet").color(theme::TEXT_DIM));
        return;
    }
    let ctx = ui.ctx().clone();

    for task in &project.tasks {
        egui::Frame::default()
            .fill(theme::BG_CARD)
            .rounding(6.0)
            .inner_margin(egui::Margin::same(8.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&task.name).strong().color(theme::TEXT_PRIMARY));
                    ui.label(
                        RichText::new(format!(
                            "{} → {} · {:.0}h",
                            task.start_date.format("%d/%m/%Y"),
                            task.end_date.format("%d/%m/%Y"),
                            task.estimated_hours
                        ))
                        .font(theme::font_small())
                        .color(theme::TEXT_DIM),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(icons::TRASH).on_hover_text("Delete task").clicked() {
                            events.push(HubEvent::Dispatch(Action::DeleteNode {
                                id: task.id.clone(),
                                kind: NodeKind::Task,
                            }));
                        }
                    });
                });

                ui.horizontal(|ui| {
                    let mut status = task.status;
                    egui::ComboBox::from_id_salt(("task-status", &task.id))
                        .selected_text(RichText::new(status.label()).color(theme::task_status_color(status)))
                        .width(110.0)
                        .show_ui(ui, |ui| {
                            for s in TaskStatus::ALL {
                                ui.selectable_value(&mut status, s, s.label());
                            }
                        });
                    if status != task.status {
                        events.push(HubEvent::Dispatch(Action::UpdateTask(TaskPatch {
                            status: Some(status),
                            ..TaskPatch::new(&task.id)
                        })));
                    }

                    if let Some(patch) = assignee_combo(app, project, task, ui) {
                        events.push(HubEvent::Dispatch(Action::UpdateTask(patch)));
                    }
                });

                egui::CollapsingHeader::new(format!("Comments ({})", task.comments.len()))
                    .id_salt(("task-comments", &task.id))
                    .show(ui, |ui| {
                        for comment in &task.comments {
                            ui.label(
                                RichText::new(format!("{}: {}", comment.author, comment.text))
                                    .color(theme::TEXT_SECONDARY),
                            );
                        }
                        let draft_id = buffer_id(&task.id, "comment");
                        let mut draft = edit_buffer(&ctx, draft_id, "");
                        ui.horizontal(|ui| {
                            ui.add(egui::TextEdit::singleline(&mut draft).hint_text("Add a comment..."));
                            if ui
                                .add_enabled(!draft.trim().is_empty(), egui::Button::new("Post"))
                                .clicked()
                            {
                                events.push(HubEvent::Dispatch(Action::AddComment {
                                    task_id: task.id.clone(),
                                    author: COMMENT_AUTHOR.to_string(),
                                    text: draft.trim().to_string(),
                                }));
                                draft.clear();
                            }
                        });
                        ctx.data_mut(|d| d.insert_temp(draft_id, draft));
                    });
            });
        ui.add_space(4.0);
    }
}

/// Person or group picker for a task. Returns the patch when the choice changed.
fn assignee_combo(app: &WorkHubApp, project: &Project, task: &Task, ui: &mut Ui) -> Option<TaskPatch> {
    let current = match (&task.assignee_id, &task.assignee_group_id) {
        (Some(pid), _) => app
            .indexes
            .person(pid)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| pid.clone()),
        (None, Some(gid)) => app
            .workspace
            .find_group(gid)
            .map(|g| format!("Group: {}", g.name))
            .unwrap_or_else(|| gid.clone()),
        (None, None) => "Unassigned".to_string(),
    };
    let mut patch = None;
    egui::ComboBox::from_id_salt(("task-assignee", &task.id))
        .selected_text(current)
        .width(170.0)
        .show_ui(ui, |ui| {
            for person in &project.people {
                let selected = task.assignee_id.as_deref() == Some(person.person_id.as_str());
                if ui.selectable_label(selected, &person.name).clicked() && !selected {
                    patch = Some(TaskPatch {
                        assignee_id: Some(person.person_id.clone()),
                        ..TaskPatch::new(&task.id)
                    });
                }
            }
            for group in &app.workspace.groups {
                let selected = task.assignee_group_id.as_deref() == Some(group.id.as_str());
                if ui
                    .selectable_label(selected, format!("Group: {}", group.name))
                    .clicked()
                    && !selected
                {
                    patch = Some(TaskPatch {
                        assignee_group_id: Some(group.id.clone()),
                        ..TaskPatch::new(&task.id)
                    });
                }
            }
        });
    patch
}

fn show_board(project: &Project, ui: &mut Ui) {
    let columns = board_columns(project.tasks.iter().map(|t| t.as_ref()));
    let width = (ui.available_width() / columns.len() as f32 - 8.0).max(110.0);
    ui.horizontal_top(|ui| {
        for (status, tasks) in columns {
            ui.vertical(|ui| {
                ui.set_width(width);
                ui.label(
                    RichText::new(format!("{} ({})", status.label(), tasks.len()))
                        .strong()
                        .color(theme::task_status_color(status)),
                );
                ui.add_space(4.0);
                for task in tasks {
                    egui::Frame::default()
                        .fill(theme::BG_CARD)
                        .stroke(Stroke::new(1.0, theme::BORDER_SUBTLE))
                        .rounding(4.0)
                        .inner_margin(egui::Margin::same(6.0))
                        .show(ui, |ui| {
                            ui.set_width(width - 12.0);
                            ui.label(RichText::new(&task.name).color(theme::TEXT_PRIMARY));
                            ui.label(
                                RichText::new(task.end_date.format("due %d/%m").to_string())
                                    .font(theme::font_small())
                                    .color(theme::TEXT_DIM),
                            );
                        });
                    ui.add_space(4.0);
                }
            });
        }
    });
}
