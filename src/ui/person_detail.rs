use egui::{Color32, Id, RichText, Ui};
use egui_phosphor::regular as icons;

use workhub::model::{Location, NodeKind, NodeRef, Person, ResourceType};
use workhub::reducer::{Action, PersonPatch};
use workhub::selection::Selection;
use workhub::utilization::{allocation_by_person, FULL_ALLOCATION};

use crate::app::WorkHubApp;
use crate::ui::dialogs::{format_tags, parse_optional_number, parse_tags};
use crate::ui::org_chart::tag_chip;
use crate::ui::theme;

enum DetailEvent {
    Close,
    Select(Selection),
    OpenHub(String),
    Edit,
    CancelEdit,
    Save(PersonPatch),
}

/// Text buffers of the "Edit Person" form.
#[derive(Debug, Clone, Default, PartialEq)]
struct PersonForm {
    name: String,
    role: String,
    email: String,
    tags: String,
    resource_type: Option<ResourceType>,
    monthly_cost: String,
    billable_rate: String,
    error: Option<String>,
}

impl PersonForm {
    fn from_person(person: &Person) -> Self {
        let number = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        Self {
            name: person.name.clone(),
            role: person.role.clone(),
            email: person.email.clone(),
            tags: format_tags(&person.tags),
            resource_type: person.resource_type,
            monthly_cost: number(person.monthly_cost),
            billable_rate: number(person.billable_rate),
            error: None,
        }
    }

    fn to_patch(&self, person_id: &str) -> Result<PersonPatch, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        Ok(PersonPatch {
            name: Some(name.to_string()),
            role: Some(self.role.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            tags: Some(parse_tags(&self.tags)),
            resource_type: self.resource_type,
            monthly_cost: parse_optional_number(&self.monthly_cost, "Monthly cost")?,
            billable_rate: parse_optional_number(&self.billable_rate, "Billable rate")?,
            ..PersonPatch::new(person_id)
        })
    }
}

fn form_id(person_id: &str) -> Id {
    Id::new(("person_edit", person_id))
}

fn forget_form(ctx: &egui::Context, id: Id) {
    ctx.data_mut(|d| {
        d.remove::<PersonForm>(id);
    });
}

/// Draws the form, returning the event its buttons produced.
fn show_edit_form(form: &mut PersonForm, person_id: &str, ui: &mut Ui) -> Option<DetailEvent> {
    let mut event = None;
    egui::Grid::new(("person_edit_grid", person_id))
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            for (label, buffer) in [
                ("Name", &mut form.name),
                ("Role", &mut form.role),
                ("Email", &mut form.email),
                ("Tags", &mut form.tags),
                ("Monthly cost", &mut form.monthly_cost),
                ("Billable rate", &mut form.billable_rate),
            ] {
                ui.label(RichText::new(label).color(theme::TEXT_SECONDARY));
                ui.text_edit_singleline(buffer);
                ui.end_row();
            }
            ui.label(RichText::new("Resource type").color(theme::TEXT_SECONDARY));
            egui::ComboBox::from_id_salt(("person_edit_type", person_id))
                .selected_text(form.resource_type.map(ResourceType::label).unwrap_or("Not set"))
                .show_ui(ui, |ui| {
                    for kind in ResourceType::ALL {
                        ui.selectable_value(&mut form.resource_type, Some(kind), kind.label());
                    }
                });
            ui.end_row();
        });
    ui.label(
        RichText::new("Tags as Type:Value, comma separated")
            .font(theme::font_small())
            .color(theme::TEXT_DIM),
    );
    if let Some(error) = &form.error {
        ui.label(RichText::new(error).color(theme::WARNING));
    }
    ui.horizontal(|ui| {
        let save = egui::Button::new(RichText::new("Save").color(Color32::WHITE)).fill(theme::ACCENT);
        if ui.add(save).clicked() {
            match form.to_patch(person_id) {
                Ok(patch) => event = Some(DetailEvent::Save(patch)),
                Err(e) => form.error = Some(e),
            }
        }
        if ui.button("Cancel").clicked() {
            event = Some(DetailEvent::CancelEdit);
        }
    });
    event
}

/// Side panel for the person currently opened from the org chart.
pub fn show_person_detail(app: &mut WorkHubApp, ui: &mut Ui) {
    let Some(person_id) = app.highlight.person_detail.clone() else {
        return;
    };
    let Some(person) = app.indexes.person(&person_id) else {
        app.highlight.close_person_detail();
        return;
    };
    let mut events = Vec::new();
    let ctx = ui.ctx().clone();
    let edit_id = form_id(&person_id);
    let mut form: Option<PersonForm> = ctx.data_mut(|d| d.get_temp(edit_id));

    ui.horizontal(|ui| {
        ui.label(
            RichText::new(format!("{} {}", icons::USER, person.name))
                .font(theme::font_header())
                .color(theme::TEXT_PRIMARY),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(icons::X).on_hover_text("Close").clicked() {
                events.push(DetailEvent::Close);
            }
            if form.is_none() && ui.button(icons::PENCIL_SIMPLE).on_hover_text("Edit person").clicked() {
                events.push(DetailEvent::Edit);
            }
        });
    });
    if let Some(form) = form.as_mut() {
        ui.add_space(4.0);
        if let Some(event) = show_edit_form(form, &person_id, ui) {
            events.push(event);
        }
        ui.separator();
    } else if !person.role.is_empty() {
        ui.label(RichText::new(&person.role).color(theme::TEXT_SECONDARY));
    }
    if form.is_none() && !person.email.is_empty() {
        ui.label(
            RichText::new(format!("{} {}", icons::ENVELOPE, person.email))
                .font(theme::font_small())
                .color(theme::TEXT_DIM),
        );
    }
    if let Some(ooo) = &person.ooo {
        ui.label(RichText::new(format!("Out of office: {ooo}")).color(theme::WARNING));
    }
    ui.add_space(8.0);

    if !person.tags.is_empty() {
        ui.label(RichText::new("Tags").strong().color(theme::TEXT_PRIMARY));
        ui.horizontal_wrapped(|ui| {
            for tag in &person.tags {
                if tag_chip(app, tag, ui) {
                    events.push(DetailEvent::Select(Selection::tag(tag.tag_type.clone(), &tag.value)));
                }
            }
        });
        ui.add_space(8.0);
    }

    let today = chrono::Local::now().date_naive();
    let total = allocation_by_person(&app.workspace.tree, today)
        .get(&person_id)
        .copied()
        .unwrap_or(0);
    let color = if total > FULL_ALLOCATION {
        theme::WARNING
    } else {
        theme::TEXT_PRIMARY
    };
    ui.label(RichText::new(format!("Allocated today: {total}%")).color(color));
    ui.add_space(8.0);

    ui.label(RichText::new("Projects").strong().color(theme::TEXT_PRIMARY));
    let assignment_nodes = app
        .indexes
        .assignments_by_person
        .get(&person_id)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for node_id in assignment_nodes {
        let tree = &app.workspace.tree;
        let Some(Location::Person(c, p, j, k)) = tree.locate_kind(node_id, NodeKind::Person) else {
            continue;
        };
        let (Some(NodeRef::Project(project)), Some(NodeRef::Person(assignment))) = (
            tree.node_at(Location::Project(c, p, j)),
            tree.node_at(Location::Person(c, p, j, k)),
        ) else {
            continue;
        };
        ui.horizontal(|ui| {
            if ui
                .add(egui::Button::new(RichText::new(&project.name).color(theme::TEXT_PRIMARY)).frame(false))
                .clicked()
            {
                events.push(DetailEvent::OpenHub(project.id.clone()));
            }
            if let Some(a) = assignment.assignments.iter().find(|a| a.project_id == project.id) {
                ui.label(
                    RichText::new(format!("{}%", a.allocation))
                        .font(theme::font_small())
                        .color(theme::TEXT_DIM),
                );
            }
            if assignment.role != person.role && !assignment.role.is_empty() {
                ui.label(
                    RichText::new(&assignment.role)
                        .font(theme::font_small())
                        .color(theme::TEXT_SECONDARY),
                );
            }
        });
    }

    let editing = form.is_some();
    if let Some(form) = form {
        ctx.data_mut(|d| d.insert_temp(edit_id, form));
    }

    for event in events {
        match event {
            DetailEvent::Close => {
                forget_form(&ctx, edit_id);
                app.highlight.close_person_detail();
            }
            DetailEvent::Select(selection) => app.select(selection),
            DetailEvent::OpenHub(id) => app.open_hub(&id),
            DetailEvent::Edit => {
                if !editing {
                    if let Some(person) = app.indexes.person(&person_id) {
                        let form = PersonForm::from_person(person);
                        ctx.data_mut(|d| d.insert_temp(edit_id, form));
                    }
                }
            }
            DetailEvent::CancelEdit => forget_form(&ctx, edit_id),
            DetailEvent::Save(patch) => {
                forget_form(&ctx, edit_id);
                app.dispatch(Action::UpdatePerson(patch));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workhub::model::{Tag, TagType};

    #[test]
    fn form_round_trips_identity_fields() {
        let mut person = Person::new("n1", "p1", "Alice").with_role("Designer").with_tag(TagType::Team, "Creative");
        person.monthly_cost = Some(8000.0);
        let mut form = PersonForm::from_person(&person);
        form.name = "  Alice Smith ".into();
        form.tags = "Team:Delivery, Figma".into();

        let patch = form.to_patch("p1").unwrap();
        assert_eq!(patch.person_id, "p1");
        assert_eq!(patch.name.as_deref(), Some("Alice Smith"));
        assert_eq!(patch.monthly_cost, Some(8000.0));
        assert_eq!(patch.billable_rate, None);
        assert_eq!(
            patch.tags,
            Some(vec![Tag::new(TagType::Team, "Delivery"), Tag::new(TagType::Skill, "Figma")])
        );
    }

    #[test]
    fn form_rejects_blank_name_and_negative_cost() {
        let person = Person::new("n1", "p1", "Alice");
        let mut form = PersonForm::from_person(&person);
        form.monthly_cost = "-5".into();
        assert!(form.to_patch("p1").is_err());
        form.monthly_cost.clear();
        form.name = "   ".into();
        assert_eq!(form.to_patch("p1"), Err("Name is required".to_string()));
    }
}
