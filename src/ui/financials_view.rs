use egui::{RichText, Stroke, Ui};

use workhub::financials::summarize;
use workhub::utilization::{allocation_by_person, over_utilized, FULL_ALLOCATION};

use crate::app::WorkHubApp;
use crate::ui::theme;

fn money(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", v.abs());
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}")
}

fn stat_card(ui: &mut Ui, label: &str, value: String, color: egui::Color32) {
    egui::Frame::default()
        .fill(theme::BG_CARD)
        .stroke(Stroke::new(1.0, theme::BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_min_width(170.0);
            ui.label(RichText::new(label).font(theme::font_small()).color(theme::TEXT_DIM));
            ui.label(RichText::new(value).size(20.0).strong().color(color));
        });
}

/// Portfolio cost and revenue, plus who is booked beyond full time today.
pub fn show_financials(app: &mut WorkHubApp, ui: &mut Ui) {
    let summary = summarize(&app.workspace.tree);
    let today = chrono::Local::now().date_naive();
    let allocation = allocation_by_person(&app.workspace.tree, today);

    ui.label(RichText::new("Financials").font(theme::font_header()).color(theme::TEXT_PRIMARY));
    ui.add_space(8.0);
    ui.horizontal_wrapped(|ui| {
        stat_card(ui, "Monthly cost", money(summary.monthly_cost), theme::TEXT_PRIMARY);
        stat_card(
            ui,
            "Potential monthly revenue",
            money(summary.potential_monthly_revenue),
            theme::TEXT_PRIMARY,
        );
        let profit_color = if summary.estimated_monthly_profit < 0.0 {
            theme::TODAY_LINE
        } else {
            theme::bar_color(2)
        };
        stat_card(
            ui,
            "Estimated monthly profit",
            money(summary.estimated_monthly_profit),
            profit_color,
        );
        stat_card(
            ui,
            "Active projects",
            format!("{} / {}", summary.active_projects, summary.total_projects),
            theme::TEXT_PRIMARY,
        );
    });

    ui.add_space(16.0);
    ui.label(
        RichText::new(format!("Allocation on {}", today.format("%d/%m/%Y")))
            .strong()
            .color(theme::TEXT_PRIMARY),
    );
    ui.add_space(4.0);

    let over = over_utilized(&app.workspace.tree, today);
    if !over.is_empty() {
        let names: Vec<String> = over
            .iter()
            .map(|(pid, total)| {
                let name = app.indexes.person(pid).map(|p| p.name.as_str()).unwrap_or(pid.as_str());
                format!("{name} ({total}%)")
            })
            .collect();
        ui.label(
            RichText::new(format!("Over-allocated: {}", names.join(", ")))
                .color(theme::WARNING),
        );
        ui.add_space(4.0);
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("allocation_grid")
                .num_columns(3)
                .striped(true)
                .spacing([24.0, 6.0])
                .show(ui, |ui| {
                    for heading in ["PERSON", "ROLE", "ALLOCATION"] {
                        ui.label(RichText::new(heading).size(9.0).color(theme::TEXT_DIM).strong());
                    }
                    ui.end_row();

                    for person in app.indexes.people_sorted() {
                        let total = allocation.get(&person.person_id).copied().unwrap_or(0);
                        let color = if total > FULL_ALLOCATION {
                            theme::WARNING
                        } else {
                            theme::TEXT_PRIMARY
                        };
                        ui.label(&person.name);
                        ui.label(RichText::new(&person.role).color(theme::TEXT_SECONDARY));
                        ui.label(RichText::new(format!("{total}%")).color(color));
                        ui.end_row();
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::money;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "$0");
        assert_eq!(money(1234567.4), "$1,234,567");
        assert_eq!(money(-950.0), "-$950");
    }
}
