use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use workhub::model::{Assignee, Task};
use workhub::timeline::{self, Bar, Granularity, TimelineLayout};

use crate::app::WorkHubApp;
use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const LABEL_WIDTH: f32 = theme::LABEL_COLUMN_WIDTH;

/// One horizontal lane of the chart.
struct Row<'a> {
    label: String,
    /// Project headings carry no bars and are drawn as section dividers.
    heading: bool,
    bars: Vec<(&'a Task, Bar)>,
}

/// Render the timeline: one lane per task grouped under its project, or one
/// lane per assignee when the resource toggle is on.
pub fn show_timeline(app: &mut WorkHubApp, ui: &mut Ui) {
    let visible = app.visible_tree();
    let tree = &visible;
    let tasks: Vec<&Task> = tree.tasks().collect();
    let layout = timeline::layout_timeline(tasks.iter().copied(), app.granularity);
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), *t)).collect();

    let rows: Vec<Row> = if app.timeline_by_resource {
        timeline::resource_rows(tasks.iter().copied(), &layout, &app.indexes, &app.workspace.groups)
            .into_iter()
            .map(|row| Row {
                label: row.label,
                heading: false,
                bars: row
                    .bars
                    .into_iter()
                    .filter_map(|bar| by_id.get(bar.task_id.as_str()).map(|t| (*t, bar)))
                    .collect(),
            })
            .collect()
    } else {
        let mut rows = Vec::new();
        for project in tree.projects() {
            if project.tasks.is_empty() {
                continue;
            }
            rows.push(Row {
                label: project.name.clone(),
                heading: true,
                bars: Vec::new(),
            });
            for task in &project.tasks {
                if let Some(bar) = layout.bar(&task.id) {
                    rows.push(Row {
                        label: task.name.clone(),
                        heading: false,
                        bars: vec![(task.as_ref(), bar.clone())],
                    });
                }
            }
        }
        rows
    };

    let mut clicked_project: Option<String> = None;
    let available = ui.available_size();
    let chart_width = (LABEL_WIDTH + layout.total_width_px()).max(available.x);
    let chart_height = HEADER_HEIGHT + rows.len() as f32 * (ROW_HEIGHT + ROW_PADDING) + 40.0;

    if rows.is_empty() {
        ui.label(
            egui::RichText::new("No tasks yet. Open a project to add some.")
                .color(theme::TEXT_DIM),
        );
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::hover(),
            );
            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            let top_left = response.rect.min;
            let origin = Pos2::new(top_left.x + LABEL_WIDTH, top_left.y);
            let height = response.rect.height();

            draw_timeline_header(&painter, origin, &layout, height);

            for (i, row) in rows.iter().enumerate() {
                let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING);
                let row_bg = if row.heading {
                    theme::BG_HEADER
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };
                painter.rect_filled(
                    Rect::from_min_size(
                        Pos2::new(top_left.x, y),
                        Vec2::new(chart_width, ROW_HEIGHT + ROW_PADDING),
                    ),
                    0.0,
                    row_bg,
                );
                painter.line_segment(
                    [
                        Pos2::new(top_left.x, y + ROW_HEIGHT + ROW_PADDING),
                        Pos2::new(top_left.x + chart_width, y + ROW_HEIGHT + ROW_PADDING),
                    ],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );

                let label_rect = Rect::from_min_size(
                    Pos2::new(top_left.x, y),
                    Vec2::new(LABEL_WIDTH - 8.0, ROW_HEIGHT),
                );
                let (font, color, indent) = if row.heading {
                    (theme::font_header(), theme::TEXT_PRIMARY, 8.0)
                } else {
                    (theme::font_bar(), theme::TEXT_SECONDARY, 20.0)
                };
                painter.with_clip_rect(label_rect).text(
                    Pos2::new(top_left.x + indent, y + ROW_HEIGHT / 2.0),
                    egui::Align2::LEFT_CENTER,
                    &row.label,
                    font,
                    color,
                );

                for (j, (task, bar)) in row.bars.iter().enumerate() {
                    let highlighted = app.highlighted.contains(&task.project_id);
                    let bar_rect = draw_task_bar(
                        &painter,
                        origin,
                        task,
                        bar,
                        y + ROW_PADDING,
                        highlighted,
                    );
                    let bar_response = ui.interact(
                        bar_rect,
                        ui.make_persistent_id(("timeline-bar", &task.id, i, j)),
                        Sense::click(),
                    );
                    if bar_response.clicked() {
                        clicked_project = Some(task.project_id.clone());
                    }
                    bar_response.on_hover_ui_at_pointer(|ui| {
                        ui.strong(&task.name);
                        ui.label(format!(
                            "{} – {}",
                            task.start_date.format("%d/%m/%Y"),
                            task.end_date.format("%d/%m/%Y")
                        ));
                        ui.label(task.status.label());
                        if let Some(name) = assignee_name(app, task) {
                            ui.label(name);
                        }
                    });
                }
            }

            draw_today_line(&painter, origin, &layout, height);
        });

    if let Some(project_id) = clicked_project {
        app.open_hub(&project_id);
    }
}

fn assignee_name(app: &WorkHubApp, task: &Task) -> Option<String> {
    match task.assignee()? {
        Assignee::Person(pid) => Some(
            app.indexes
                .person(pid)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| pid.to_string()),
        ),
        Assignee::Group(gid) => Some(
            app.workspace
                .find_group(gid)
                .map(|g| format!("Group: {}", g.name))
                .unwrap_or_else(|| gid.to_string()),
        ),
    }
}

fn draw_timeline_header(
    painter: &egui::Painter,
    origin: Pos2,
    layout: &TimelineLayout,
    height: f32,
) {
    let width = layout.total_width_px();
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let mut previous: Option<NaiveDate> = None;
    for date in layout.columns() {
        let x = origin.x + layout.x_for(date);
        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );

        // Month label whenever the month changes under the column.
        let new_month = previous.map_or(true, |p| p.month() != date.month() || p.year() != date.year());
        match layout.granularity {
            Granularity::Day => {
                let is_weekend = date.weekday().num_days_from_monday() >= 5;
                painter.text(
                    Pos2::new(x + 3.0, origin.y + 28.0),
                    egui::Align2::LEFT_CENTER,
                    date.format("%d").to_string(),
                    theme::font_sub(),
                    if is_weekend { theme::TEXT_DIM } else { theme::TEXT_SECONDARY },
                );
                if new_month {
                    draw_month_label(painter, x, origin.y + 12.0, date);
                }
            }
            Granularity::Week => {
                painter.text(
                    Pos2::new(x + 3.0, origin.y + 28.0),
                    egui::Align2::LEFT_CENTER,
                    date.format("W%V").to_string(),
                    theme::font_sub(),
                    theme::TEXT_SECONDARY,
                );
                if new_month {
                    draw_month_label(painter, x, origin.y + 12.0, date);
                }
            }
            Granularity::Month => draw_month_label(painter, x + 2.0, origin.y + 18.0, date),
        }
        previous = Some(date);
    }
}

fn draw_month_label(painter: &egui::Painter, x: f32, y: f32, date: NaiveDate) {
    painter.text(
        Pos2::new(x + 3.0, y),
        egui::Align2::LEFT_CENTER,
        date.format("%b %Y").to_string(),
        theme::font_header(),
        theme::TEXT_PRIMARY,
    );
}

fn draw_today_line(painter: &egui::Painter, origin: Pos2, layout: &TimelineLayout, height: f32) {
    let today = chrono::Local::now().date_naive();
    let offset = layout.x_for(today);
    if offset < 0.0 || offset > layout.total_width_px() {
        return;
    }
    let x = origin.x + offset;

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_task_bar(
    painter: &egui::Painter,
    origin: Pos2,
    task: &Task,
    bar: &Bar,
    y: f32,
    highlighted: bool,
) -> Rect {
    let inset = theme::BAR_INSET;
    let bar_rect = Rect::from_min_size(
        Pos2::new(origin.x + bar.left_px, y + inset),
        Vec2::new(bar.width_px.max(6.0), ROW_HEIGHT - inset * 2.0),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar_rect, rounding, theme::task_status_color(task.status));
    painter.rect_filled(
        Rect::from_min_size(
            bar_rect.min,
            Vec2::new(bar_rect.width(), (bar_rect.height() * 0.45).max(4.0)),
        ),
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if highlighted {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if bar_rect.width() > 30.0 {
        let galley = painter.layout_no_wrap(task.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        painter.with_clip_rect(bar_rect).galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }

    bar_rect
}
