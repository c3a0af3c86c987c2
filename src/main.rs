#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use workhub::config::{self, AppSettings};

fn main() -> eframe::Result<()> {
    let (settings, problem) = AppSettings::load_or_default();
    workhub::logging::init(&settings.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting WorkHub");
    if let Some(e) = problem {
        tracing::warn!(path = %config::settings_path().display(), "using default settings: {e}");
    } else if !config::settings_path().exists() {
        settings.save();
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 860.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("WorkHub"),
        ..Default::default()
    };

    eframe::run_native(
        "WorkHub",
        options,
        Box::new(|cc| Ok(Box::new(app::WorkHubApp::new(cc, settings)))),
    )
}
