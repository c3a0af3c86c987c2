//! Sample workspace shown on first run.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::model::{
    Assignment, Client, Comment, Group, Person, Program, Project, ProjectStatus, ResourceType,
    TagType, Task, TaskStatus, WorkTree, Workspace,
};

/// Monthly cost, billable rate and skills by job level. The last entry is
/// the fallback.
const LEVEL_RATES: &[(u8, f64, f64, &[&str])] = &[
    (9, 20000.0, 400.0, &["Executive Leadership", "Strategy"]),
    (8, 16000.0, 350.0, &["Management", "Strategy"]),
    (7, 14000.0, 300.0, &["Management", "Client Relations"]),
    (6, 12000.0, 250.0, &["Project Management", "Client Relations"]),
    (5, 9000.0, 180.0, &["Account Management", "Coordination"]),
    (4, 6000.0, 120.0, &["Coordination", "Reporting"]),
    (3, 4000.0, 80.0, &["Reporting", "Admin"]),
    (0, 5000.0, 100.0, &["General"]),
];

fn rate_for_level(level: u8) -> (f64, f64, &'static [&'static str]) {
    let (_, cost, rate, skills) = LEVEL_RATES
        .iter()
        .find(|(l, ..)| *l == level)
        .or(LEVEL_RATES.last())
        .copied()
        .unwrap_or((0, 0.0, 0.0, &[]));
    (cost, rate, skills)
}

struct Staff {
    name: &'static str,
    role: &'static str,
    level: u8,
    team: &'static str,
    client: &'static str,
}

const STAFF: &[Staff] = &[
    Staff { name: "Ada Lindqvist", role: "Business Director", level: 7, team: "Account Management", client: "Northwind" },
    Staff { name: "Bruno Okafor", role: "Account Director", level: 6, team: "Account Management", client: "Northwind" },
    Staff { name: "Chiara Vela", role: "Senior Account Manager", level: 5, team: "Account Management", client: "Contoso" },
    Staff { name: "Dev Raman", role: "Group Account Director", level: 6, team: "Account Management", client: "Contoso" },
    Staff { name: "Elin Marsh", role: "Account Executive", level: 3, team: "Account Management", client: "Fabrikam" },
    Staff { name: "Farah Nadeem", role: "Finance Director", level: 7, team: "Finance", client: "Internal" },
    Staff { name: "Gus Porter", role: "Managing Partner", level: 8, team: "Executive Leadership", client: "Internal" },
    Staff { name: "Hana Ito", role: "Account Manager", level: 4, team: "Account Management", client: "Fabrikam" },
];

fn slug(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap_or(NaiveDate::MIN)
}

fn person(index: usize, staff: &Staff, project_id: &str) -> Person {
    let (monthly_cost, billable_rate, skills) = rate_for_level(staff.level);
    let mut p = Person::new(
        format!("person-{index}-{}", slug(project_id)),
        format!("p-{}", slug(staff.name)),
        staff.name,
    )
    .with_role(staff.role)
    .with_tag(TagType::Team, staff.team)
    .with_tag(TagType::Location, "London");
    for skill in skills {
        p = p.with_tag(TagType::Skill, *skill);
    }
    p.email = format!("{}@example.com", staff.name.to_lowercase().replace(' ', "."));
    p.monthly_cost = Some(monthly_cost);
    p.billable_rate = Some(billable_rate);
    p.resource_type = Some(ResourceType::FullTime);
    p.assignments.push(Assignment {
        project_id: project_id.to_string(),
        allocation: 50,
        start_date: d(2025, 10, 1),
        end_date: d(2025, 12, 31),
    });
    p
}

pub fn sample_workspace() -> Workspace {
    let mut clients: Vec<Client> = Vec::new();
    for (i, staff) in STAFF.iter().enumerate() {
        let client_id = format!("client-{}", slug(staff.client));
        let project_id = format!("proj-{}", slug(staff.client));
        if !clients.iter().any(|c| c.id == client_id) {
            let mut project = Project::new(&project_id, "General Account Management");
            project.brief = format!("General account and project management for {}.", staff.client);
            project.status = ProjectStatus::Active;
            let mut program = Program::new(format!("prog-{client_id}"), "Client Management & Operations");
            program.projects.push(Arc::new(project));
            let mut client = Client::new(&client_id, staff.client);
            client.strategic_focus = "General Business Operations".into();
            client.programs.push(Arc::new(program));
            clients.push(client);
        }
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            let program = Arc::make_mut(&mut client.programs[0]);
            let project = Arc::make_mut(&mut program.projects[0]);
            project.people.push(Arc::new(person(i, staff, &project_id)));
        }
    }

    // Leadership also sits on the client accounts, so selecting them links projects.
    for client in clients.iter_mut().filter(|c| c.name != "Internal") {
        let program = Arc::make_mut(&mut client.programs[0]);
        let project = Arc::make_mut(&mut program.projects[0]);
        let project_id = project.id.clone();
        project.people.push(Arc::new(person(6, &STAFF[6], &project_id)));
    }

    let mut tree = WorkTree::new(clients);
    add_tasks(&mut tree);

    let mut leadership = Group::new("group-leadership", "Leadership");
    leadership.add_member("p-gusporter");
    leadership.add_member("p-adalindqvist");
    leadership.add_member("p-farahnadeem");

    Workspace::new(tree, vec![leadership])
}

fn add_tasks(tree: &mut WorkTree) {
    let mut strategy = Task::new("task-1", "proj-contoso", "Q4 Strategy Deck", d(2025, 10, 20), d(2025, 10, 24));
    strategy.assign_person("p-chiaravela");
    strategy.estimated_hours = 40.0;
    strategy.status = TaskStatus::InProgress;
    strategy.comments.push(Comment {
        author: "Dev".into(),
        text: "Great start on this!".into(),
    });

    let mut review = Task::new("task-2", "proj-contoso", "Review Creative Concepts", d(2025, 10, 22), d(2025, 10, 26));
    review.assign_person("p-devraman");
    review.estimated_hours = 16.0;

    let mut workshop = Task::new("task-3", "proj-northwind", "Prepare for Client Workshop", d(2025, 10, 27), d(2025, 10, 31));
    workshop.assign_person("p-adalindqvist");
    workshop.estimated_hours = 40.0;

    for task in [strategy, review, workshop] {
        for client in tree.clients.iter_mut() {
            let client = Arc::make_mut(client);
            for program in client.programs.iter_mut() {
                let program = Arc::make_mut(program);
                if let Some(project) = program.projects.iter_mut().find(|p| p.id == task.project_id) {
                    Arc::make_mut(project).tasks.push(Arc::new(task.clone()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_indexes;
    use crate::selection::{compute_highlights, Selection};

    #[test]
    fn sample_indexes_cleanly() {
        let ws = sample_workspace();
        let idx = build_indexes(&ws.tree).unwrap();
        assert_eq!(idx.person_by_id.len(), STAFF.len());
        assert_eq!(ws.tree.tasks().count(), 3);
    }

    #[test]
    fn leadership_spans_client_projects() {
        let ws = sample_workspace();
        let lit = compute_highlights(&ws.tree, &Selection::Person("p-gusporter".into()));
        assert_eq!(lit.len(), 4);
    }
}
