//! Portfolio cost and revenue rollup.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Person, ProjectStatus, ResourceType, WorkTree};

/// Billable hours per month assumed for a full-time person.
pub const BILLABLE_HOURS_PER_MONTH: f64 = 160.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub monthly_cost: f64,
    pub potential_monthly_revenue: f64,
    pub estimated_monthly_profit: f64,
    pub active_projects: usize,
    pub total_projects: usize,
}

/// Roll up cost and revenue over distinct people. Contractors and vendors
/// contribute cost but no revenue.
pub fn summarize(tree: &WorkTree) -> FinancialSummary {
    let mut people: HashMap<&str, &Person> = HashMap::new();
    for person in tree.people() {
        people.insert(person.person_id.as_str(), person);
    }

    let monthly_cost: f64 = people.values().filter_map(|p| p.monthly_cost).sum();
    let potential_monthly_revenue: f64 = people
        .values()
        .filter(|p| p.resource_type == Some(ResourceType::FullTime))
        .filter_map(|p| p.billable_rate)
        .map(|rate| rate * BILLABLE_HOURS_PER_MONTH)
        .sum();

    FinancialSummary {
        monthly_cost,
        potential_monthly_revenue,
        estimated_monthly_profit: potential_monthly_revenue - monthly_cost,
        active_projects: tree
            .projects()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
        total_projects: tree.projects().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Client, Program, Project};
    use std::sync::Arc;

    #[test]
    fn revenue_counts_full_time_people_only() {
        let mut alice = Person::new("n1", "p1", "Alice");
        alice.monthly_cost = Some(8000.0);
        alice.billable_rate = Some(100.0);
        alice.resource_type = Some(ResourceType::FullTime);
        let mut vendor = Person::new("n2", "p2", "Vendor Co");
        vendor.monthly_cost = Some(5000.0);
        vendor.billable_rate = Some(200.0);
        vendor.resource_type = Some(ResourceType::Vendor);

        let mut x = Project::new("x", "X");
        x.status = ProjectStatus::Active;
        x.people = vec![Arc::new(alice.clone()), Arc::new(vendor)];
        let mut y = Project::new("y", "Y");
        y.people = vec![Arc::new(Person { id: "n3".into(), ..alice })];

        let mut program = Program::new("pg", "Program");
        program.projects = vec![Arc::new(x), Arc::new(y)];
        let mut client = Client::new("c", "Client");
        client.programs.push(Arc::new(program));

        let summary = summarize(&WorkTree::new(vec![client]));
        assert_eq!(summary.monthly_cost, 13000.0);
        assert_eq!(summary.potential_monthly_revenue, 16000.0);
        assert_eq!(summary.estimated_monthly_profit, 3000.0);
        assert_eq!(summary.active_projects, 1);
        assert_eq!(summary.total_projects, 2);
    }
}
