use chrono::NaiveDate;
use egui::{Color32, Context, RichText, Window};

use workhub::model::{Person, Tag, TagType, Task};
use workhub::reducer::Action;

use crate::app::WorkHubApp;
use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddKind {
    Client,
    Program,
    Project,
    Task,
    Person,
    Group,
}

/// Fields of the "Add ..." dialog. Which ones are shown depends on `kind`.
#[derive(Debug, Clone)]
pub struct AddDialog {
    pub kind: AddKind,
    /// Client, program or project the new node goes under.
    pub parent_id: String,
    pub name: String,
    /// Strategic focus, brief, or role.
    pub detail: String,
    pub budget: String,
    pub email: String,
    pub tags: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub hours: String,
    /// Reuse an existing person's identity instead of creating a new one.
    pub existing_person: Option<String>,
}

impl AddDialog {
    fn new(kind: AddKind, parent_id: impl Into<String>) -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            kind,
            parent_id: parent_id.into(),
            name: String::new(),
            detail: String::new(),
            budget: String::new(),
            email: String::new(),
            tags: String::new(),
            start: today,
            end: today + chrono::Duration::days(7),
            hours: String::new(),
            existing_person: None,
        }
    }

    pub fn client() -> Self {
        Self::new(AddKind::Client, "")
    }

    pub fn group() -> Self {
        Self::new(AddKind::Group, "")
    }

    pub fn program(client_id: &str) -> Self {
        Self::new(AddKind::Program, client_id)
    }

    pub fn project(program_id: &str) -> Self {
        Self::new(AddKind::Project, program_id)
    }

    pub fn task(project_id: &str) -> Self {
        Self::new(AddKind::Task, project_id)
    }

    pub fn person(project_id: &str) -> Self {
        Self::new(AddKind::Person, project_id)
    }

    fn title(&self) -> &'static str {
        match self.kind {
            AddKind::Client => "Add Client",
            AddKind::Program => "Add Program",
            AddKind::Project => "Add Project",
            AddKind::Task => "Add Task",
            AddKind::Person => "Add Person",
            AddKind::Group => "Add Group",
        }
    }

    fn detail_label(&self) -> Option<&'static str> {
        match self.kind {
            AddKind::Client => Some("Strategic focus"),
            AddKind::Project => Some("Brief"),
            AddKind::Person => Some("Role"),
            _ => None,
        }
    }

    /// Build the action, or explain what is wrong with the input.
    fn to_action(&self, app: &mut WorkHubApp) -> Result<Action, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() && self.existing_person.is_none() {
            return Err("Name is required".into());
        }
        let action = match self.kind {
            AddKind::Client => Action::AddClient {
                name,
                strategic_focus: self.detail.trim().to_string(),
            },
            AddKind::Program => Action::AddProgram {
                name,
                client_id: self.parent_id.clone(),
            },
            AddKind::Project => Action::AddProject {
                name,
                program_id: self.parent_id.clone(),
                brief: self.detail.trim().to_string(),
                budget: parse_optional_number(&self.budget, "Budget")?,
            },
            AddKind::Task => {
                if self.end < self.start {
                    return Err("End date is before start date".into());
                }
                let mut task = Task::new("", &self.parent_id, name, self.start, self.end);
                task.estimated_hours = parse_optional_number(&self.hours, "Hours")?.unwrap_or(0.0);
                Action::AddTask(task)
            }
            AddKind::Person => {
                let person = match &self.existing_person {
                    Some(pid) => {
                        let identity = app
                            .indexes
                            .person(pid)
                            .ok_or_else(|| format!("Unknown person {pid}"))?;
                        let mut p = identity.clone();
                        p.id = String::new();
                        p.assignments.clear();
                        p
                    }
                    None => {
                        let mut p = Person::new("", app.next_id("p"), name)
                            .with_role(self.detail.trim());
                        p.email = self.email.trim().to_string();
                        p.tags = parse_tags(&self.tags);
                        p
                    }
                };
                Action::AddPerson {
                    project_id: self.parent_id.clone(),
                    person,
                }
            }
            AddKind::Group => Action::AddGroup { name },
        };
        Ok(action)
    }
}

pub(crate) fn parse_optional_number(s: &str, field: &str) -> Result<Option<f64>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v >= 0.0 => Ok(Some(v)),
        _ => Err(format!("{field} must be a non-negative number")),
    }
}

/// `Team:Finance, Skill:Design`. A bare value is taken as a skill.
pub(crate) fn parse_tags(s: &str) -> Vec<Tag> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| match t.split_once(':') {
            Some((ty, value)) => Tag::new(ty.trim(), value.trim()),
            None => Tag::new(TagType::Skill, t),
        })
        .collect()
}

/// Inverse of [`parse_tags`], for pre-filling edit forms.
pub(crate) fn format_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| format!("{}:{}", t.tag_type, t.value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the "Add ..." dialog.
pub fn show_add_dialog(app: &mut WorkHubApp, ctx: &Context) {
    let Some(mut dialog) = app.add_dialog.take() else {
        return;
    };
    let mut should_close = false;
    let mut submit = false;
    let mut error: Option<String> = None;

    Window::new(RichText::new(dialog.title()).strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("add_dialog_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    if dialog.kind == AddKind::Person {
                        ui.label(RichText::new("Existing").color(theme::TEXT_SECONDARY));
                        let selected = dialog
                            .existing_person
                            .as_deref()
                            .and_then(|pid| app.indexes.person(pid))
                            .map(|p| p.name.clone())
                            .unwrap_or_else(|| "New person".to_string());
                        egui::ComboBox::from_id_salt("existing_person")
                            .selected_text(selected)
                            .width(220.0)
                            .show_ui(ui, |ui| {
                                ui.selectable_value(&mut dialog.existing_person, None, "New person");
                                for p in app.indexes.people_sorted() {
                                    ui.selectable_value(
                                        &mut dialog.existing_person,
                                        Some(p.person_id.clone()),
                                        &p.name,
                                    );
                                }
                            });
                        ui.end_row();
                    }

                    let new_identity = dialog.existing_person.is_none();
                    if new_identity {
                        ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                        ui.add_sized(
                            [220.0, 24.0],
                            egui::TextEdit::singleline(&mut dialog.name).hint_text("Name..."),
                        );
                        ui.end_row();
                    }

                    if let Some(label) = dialog.detail_label().filter(|_| new_identity) {
                        ui.label(RichText::new(label).color(theme::TEXT_SECONDARY));
                        if dialog.kind == AddKind::Project {
                            ui.add_sized(
                                [220.0, 60.0],
                                egui::TextEdit::multiline(&mut dialog.detail),
                            );
                        } else {
                            ui.add_sized([220.0, 24.0], egui::TextEdit::singleline(&mut dialog.detail));
                        }
                        ui.end_row();
                    }

                    match dialog.kind {
                        AddKind::Project => {
                            ui.label(RichText::new("Budget").color(theme::TEXT_SECONDARY));
                            ui.add_sized([120.0, 24.0], egui::TextEdit::singleline(&mut dialog.budget));
                            ui.end_row();
                        }
                        AddKind::Task => {
                            ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                            ui.add(egui_extras::DatePickerButton::new(&mut dialog.start).id_salt("dlg_dp_start"));
                            ui.end_row();

                            ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                            ui.add(egui_extras::DatePickerButton::new(&mut dialog.end).id_salt("dlg_dp_end"));
                            ui.end_row();

                            ui.label(RichText::new("Hours").color(theme::TEXT_SECONDARY));
                            ui.add_sized([120.0, 24.0], egui::TextEdit::singleline(&mut dialog.hours));
                            ui.end_row();
                        }
                        AddKind::Person if new_identity => {
                            ui.label(RichText::new("Email").color(theme::TEXT_SECONDARY));
                            ui.add_sized([220.0, 24.0], egui::TextEdit::singleline(&mut dialog.email));
                            ui.end_row();

                            ui.label(RichText::new("Tags").color(theme::TEXT_SECONDARY));
                            ui.add_sized(
                                [220.0, 24.0],
                                egui::TextEdit::singleline(&mut dialog.tags)
                                    .hint_text("Team:Finance, Skill:Design"),
                            );
                            ui.end_row();
                        }
                        _ => {}
                    }
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let create_btn = egui::Button::new(RichText::new("Create").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], create_btn).clicked() {
                    submit = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if submit {
        match dialog.to_action(app) {
            Ok(action) => {
                app.dispatch(action);
                should_close = true;
            }
            Err(e) => error = Some(e),
        }
    }
    if let Some(e) = error {
        app.status_message = e;
    }
    if !should_close && !ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.add_dialog = Some(dialog);
    }
}

/// Choose a project and how many placeholder people to generate from the rate card.
#[derive(Debug, Clone)]
pub struct ImportPeopleDialog {
    pub project_id: Option<String>,
    pub count: usize,
}

impl Default for ImportPeopleDialog {
    fn default() -> Self {
        Self {
            project_id: None,
            count: 20,
        }
    }
}

pub fn show_import_people_dialog(app: &mut WorkHubApp, ctx: &Context) {
    let Some(mut dialog) = app.import_people.take() else {
        return;
    };
    let mut should_close = false;
    let mut generate = false;

    Window::new(RichText::new("Generate Team").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.label(
                RichText::new(format!(
                    "Creates placeholder people from {} rate card rows.",
                    app.rates.len()
                ))
                .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(6.0);
            egui::Grid::new("import_people_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Project").color(theme::TEXT_SECONDARY));
                    let selected = dialog
                        .project_id
                        .as_deref()
                        .and_then(|id| app.indexes.project(id))
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "Choose...".to_string());
                    egui::ComboBox::from_id_salt("import_people_project")
                        .selected_text(selected)
                        .width(220.0)
                        .show_ui(ui, |ui| {
                            for project in app.workspace.tree.projects() {
                                ui.selectable_value(
                                    &mut dialog.project_id,
                                    Some(project.id.clone()),
                                    &project.name,
                                );
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("People").color(theme::TEXT_SECONDARY));
                    ui.add(egui::Slider::new(&mut dialog.count, 1..=50));
                    ui.end_row();
                });
            ui.add_space(6.0);
            ui.separator();
            ui.horizontal(|ui| {
                let ready = dialog.project_id.is_some();
                if ui
                    .add_enabled(ready, egui::Button::new("Generate").min_size(egui::vec2(80.0, 28.0)))
                    .clicked()
                {
                    generate = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
        });

    if generate {
        if let Some(project_id) = dialog.project_id.clone() {
            app.generate_people(&project_id, dialog.count);
        }
        should_close = true;
    }
    if !should_close && !ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.import_people = Some(dialog);
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut WorkHubApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("WorkHub").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Clients, programs, projects and the people on them.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_default_to_skill() {
        let tags = parse_tags("Team:Finance, Design , ,Location: London");
        assert_eq!(
            tags,
            vec![
                Tag::new(TagType::Team, "Finance"),
                Tag::new(TagType::Skill, "Design"),
                Tag::new(TagType::Location, "London"),
            ]
        );
    }

    #[test]
    fn formatted_tags_parse_back() {
        let tags = vec![Tag::new(TagType::Team, "Finance"), Tag::new("Level", "Senior")];
        assert_eq!(format_tags(&tags), "Team:Finance, Level:Senior");
        assert_eq!(parse_tags(&format_tags(&tags)), tags);
    }

    #[test]
    fn budget_must_be_non_negative() {
        assert_eq!(parse_optional_number("", "Budget"), Ok(None));
        assert_eq!(parse_optional_number("1500", "Budget"), Ok(Some(1500.0)));
        assert!(parse_optional_number("-1", "Budget").is_err());
    }
}
