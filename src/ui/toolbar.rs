use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

use workhub::timeline::Granularity;

use crate::app::{View, WorkHubApp};
use crate::ui::dialogs::{AddDialog, ImportPeopleDialog};
use crate::ui::theme;

/// Render the top menu bar and view switcher.
pub fn show_toolbar(app: &mut WorkHubApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button("  File  ", |ui| {
            if ui.button(format!("{} Open...", icons::FOLDER_OPEN)).clicked() {
                app.open_workspace();
                ui.close_menu();
            }
            if ui.button(format!("{} Save          Ctrl+S", icons::FLOPPY_DISK)).clicked() {
                app.save_workspace();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_workspace_as();
                ui.close_menu();
            }
            if ui.button("  Load Sample Workspace").clicked() {
                app.load_sample();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{} Import Rate Card...", icons::UPLOAD_SIMPLE)).clicked() {
                app.import_rates();
                ui.close_menu();
            }
            let can_generate = !app.rates.is_empty();
            if ui
                .add_enabled(can_generate, egui::Button::new("  Generate Team from Rates..."))
                .clicked()
            {
                app.import_people = Some(ImportPeopleDialog::default());
                ui.close_menu();
            }
            if ui.button(format!("{} Export Tasks CSV...", icons::DOWNLOAD_SIMPLE)).clicked() {
                app.export_tasks(None);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Open Data Folder").clicked() {
                app.open_data_folder();
                ui.close_menu();
            }
        });

        ui.menu_button("  Add  ", |ui| {
            if ui.button("  Client...").clicked() {
                app.add_dialog = Some(AddDialog::client());
                ui.close_menu();
            }
            if ui.button("  Group...").clicked() {
                app.add_dialog = Some(AddDialog::group());
                ui.close_menu();
            }
        });

        ui.menu_button("  Help  ", |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();
        for view in View::ALL {
            let label = RichText::new(view.label()).font(theme::font_header());
            if ui.selectable_label(app.view == view, label).clicked() {
                app.view = view;
            }
        }

        if app.view == View::Timeline {
            ui.separator();
            for g in Granularity::ALL {
                if ui.selectable_label(app.granularity == g, g.label()).clicked() {
                    app.set_granularity(g);
                }
            }
            ui.checkbox(&mut app.timeline_by_resource, "By person");
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let modified = if app.dirty { " (unsaved)" } else { "" };
            ui.label(
                RichText::new(format!("{}{}", app.store.path().display(), modified))
                    .size(11.0)
                    .weak(),
            );
            if !app.highlight.selection.is_none() && ui.small_button("Clear highlight").clicked() {
                app.clear_selection();
            }
        });
    });
}

/// "All Clients" plus one chip per client. Clicking the active chip again
/// goes back to all clients.
pub fn show_client_filter(app: &mut WorkHubApp, ui: &mut Ui) {
    let mut choice = None;
    ui.horizontal_wrapped(|ui| {
        ui.label(RichText::new(icons::FUNNEL).color(theme::TEXT_DIM));
        if ui
            .selectable_label(app.client_filter.is_none(), "All Clients")
            .clicked()
        {
            choice = Some(None);
        }
        for client in &app.workspace.tree.clients {
            let active = app.client_filter.as_deref() == Some(client.id.as_str());
            if ui.selectable_label(active, &client.name).clicked() {
                choice = Some(if active { None } else { Some(client.id.clone()) });
            }
        }
    });
    if let Some(filter) = choice {
        app.set_client_filter(filter);
    }
}
