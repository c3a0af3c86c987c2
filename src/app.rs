use std::collections::{BTreeSet, HashSet};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use tracing::{error, info, warn};

use workhub::config::{self, AppSettings};
use workhub::enrich::{self, Enricher, Enrichment, EnrichmentOutcome, EnrichmentTracker, GeminiEnricher};
use workhub::index::{build_indexes, Indexes};
use workhub::io::csv_import::{self, RateTable};
use workhub::model::{NodeKind, WorkTree, Workspace};
use workhub::reducer::{self, Action, UuidIds};
use workhub::selection::{compute_highlights, HighlightState, Selection};
use workhub::store::{DocumentStore, JsonFileStore};
use workhub::timeline::Granularity;

use crate::ui;
use crate::ui::dialogs::{AddDialog, ImportPeopleDialog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    OrgChart,
    Network,
    Timeline,
    Groups,
    Financials,
}

impl View {
    pub const ALL: [View; 5] = [
        View::OrgChart,
        View::Network,
        View::Timeline,
        View::Groups,
        View::Financials,
    ];

    /// Views that draw the hierarchy and honor the client filter.
    pub fn is_filtered(self) -> bool {
        matches!(self, View::OrgChart | View::Network | View::Timeline)
    }

    pub fn label(self) -> &'static str {
        match self {
            View::OrgChart => "Org Chart",
            View::Network => "Network",
            View::Timeline => "Timeline",
            View::Groups => "Groups",
            View::Financials => "Financials",
        }
    }
}

/// Main application state.
pub struct WorkHubApp {
    pub settings: AppSettings,
    pub store: JsonFileStore,
    pub workspace: Workspace,
    pub indexes: Indexes,
    pub highlight: HighlightState,
    pub highlighted: BTreeSet<String>,
    ids: UuidIds,
    pub dirty: bool,

    pub view: View,
    pub granularity: Granularity,
    pub timeline_by_resource: bool,
    pub collapsed: HashSet<String>,
    /// Client whose subtree the hierarchy views are limited to.
    pub client_filter: Option<String>,

    // Project hub
    pub hub_project: Option<String>,
    pub enrichment: EnrichmentTracker,
    enrichment_rx: Option<Receiver<EnrichmentOutcome>>,
    pub enrichment_result: Option<(String, Enrichment)>,

    // Dialog state
    pub add_dialog: Option<AddDialog>,
    pub import_people: Option<ImportPeopleDialog>,
    pub show_about: bool,

    pub rates: RateTable,

    // Status message
    pub status_message: String,
}

impl WorkHubApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let store = JsonFileStore::new(settings.data_file());
        let (workspace, status_message) = if store.exists() {
            match store.load_workspace() {
                Ok(ws) => (ws, format!("Loaded {}", store.path().display())),
                Err(e) => {
                    error!("failed to load workspace: {e}");
                    (Workspace::default(), format!("Error loading workspace: {e}"))
                }
            }
        } else {
            info!("no workspace on disk, starting from the sample");
            (workhub::seed::sample_workspace(), "Sample workspace loaded".to_string())
        };

        let rates = RateTable::load_from(&rates_path()).unwrap_or_else(|e| {
            warn!("ignoring rate table: {e}");
            RateTable::default()
        });

        let mut app = Self {
            granularity: settings.granularity,
            settings,
            store,
            workspace: Workspace::default(),
            indexes: Indexes::default(),
            highlight: HighlightState::default(),
            highlighted: BTreeSet::new(),
            ids: UuidIds,
            dirty: false,
            view: View::OrgChart,
            timeline_by_resource: false,
            collapsed: HashSet::new(),
            client_filter: None,
            hub_project: None,
            enrichment: EnrichmentTracker::default(),
            enrichment_rx: None,
            enrichment_result: None,
            add_dialog: None,
            import_people: None,
            show_about: false,
            rates,
            status_message,
        };
        app.replace_workspace(workspace);
        app
    }

    // --- State transitions ---

    /// Apply an action through the reducer and re-derive everything from the result.
    pub fn dispatch(&mut self, action: Action) {
        let name = action.name();
        let next = reducer::apply(&self.workspace, action, &mut self.ids);
        if next == self.workspace {
            self.status_message = format!("{name}: nothing changed");
            return;
        }
        match build_indexes(&next.tree) {
            Ok(indexes) => {
                self.workspace = next;
                self.indexes = indexes;
                self.dirty = true;
                self.after_change();
                self.status_message = format!("{name} applied");
            }
            Err(e) => {
                error!(action = name, "rejected edit: {e}");
                self.status_message = format!("Edit rejected: {e}");
            }
        }
    }

    pub fn replace_workspace(&mut self, workspace: Workspace) {
        match build_indexes(&workspace.tree) {
            Ok(indexes) => {
                self.workspace = workspace;
                self.indexes = indexes;
                self.highlight = HighlightState::default();
                self.client_filter = None;
                self.hub_project = None;
                self.enrichment.cancel();
                self.enrichment_result = None;
                self.after_change();
            }
            Err(e) => {
                error!("workspace is malformed: {e}");
                self.status_message = format!("Workspace is malformed: {e}");
            }
        }
    }

    fn after_change(&mut self) {
        if let Some(pid) = &self.highlight.person_detail {
            if self.indexes.person(pid).is_none() {
                self.highlight.close_person_detail();
            }
        }
        if let Some(id) = &self.hub_project {
            if self.indexes.project(id).is_none() {
                self.close_hub();
            }
        }
        if let Some(id) = &self.client_filter {
            if self.workspace.tree.find_client(id).is_none() {
                self.client_filter = None;
            }
        }
        self.highlighted = compute_highlights(&self.workspace.tree, &self.highlight.selection);
    }

    pub fn select(&mut self, selection: Selection) {
        self.highlight.select(selection);
        self.highlighted = compute_highlights(&self.workspace.tree, &self.highlight.selection);
    }

    /// The tree as the hierarchy views show it, after the client filter.
    pub fn visible_tree(&self) -> WorkTree {
        self.workspace.tree.for_client(self.client_filter.as_deref())
    }

    pub fn set_client_filter(&mut self, client_id: Option<String>) {
        if self.client_filter != client_id {
            let client = client_id
                .as_deref()
                .and_then(|id| self.workspace.tree.find_client(id));
            self.status_message = match client {
                Some(client) => format!("Showing {}", client.name),
                None => "Showing all clients".to_string(),
            };
            self.client_filter = client_id;
        }
    }

    pub fn clear_selection(&mut self) {
        self.highlight.clear();
        self.highlighted.clear();
    }

    pub fn open_person(&mut self, person_id: &str) {
        self.highlight.open_person_detail(person_id);
        self.select(Selection::Person(person_id.to_string()));
    }

    pub fn open_hub(&mut self, project_id: &str) {
        if self.hub_project.as_deref() != Some(project_id) {
            self.enrichment_result = None;
        }
        self.hub_project = Some(project_id.to_string());
    }

    pub fn close_hub(&mut self) {
        self.hub_project = None;
        self.enrichment_result = None;
    }

    pub fn delete_node(&mut self, id: &str, kind: NodeKind) {
        self.dispatch(Action::DeleteNode {
            id: id.to_string(),
            kind,
        });
    }

    pub fn next_id(&mut self, prefix: &str) -> String {
        use workhub::reducer::IdGenerator;
        self.ids.next_id(prefix)
    }

    // --- Enrichment ---

    pub fn start_enrichment(&mut self, project_id: &str) {
        let Some(project) = self.indexes.project(project_id) else {
            return;
        };
        if project.brief.trim().is_empty() {
            self.status_message = "Project brief is empty. Cannot enrich.".to_string();
            return;
        }
        let enricher: Arc<dyn Enricher> = match GeminiEnricher::from_env(&self.settings.enrichment) {
            Ok(e) => Arc::new(e),
            Err(e) => {
                self.status_message = format!("Enrichment unavailable: {e}");
                return;
            }
        };
        let roster: Vec<String> = project
            .people
            .iter()
            .map(|p| format!("{} ({})", p.name, p.role))
            .collect();
        let context = format!("Current team: {}", roster.join(", "));
        let ticket = self.enrichment.begin(project_id);
        self.enrichment_result = None;
        self.enrichment_rx = Some(enrich::spawn_enrichment(
            enricher,
            ticket,
            project.brief.clone(),
            context,
        ));
        self.status_message = "Enriching brief...".to_string();
    }

    fn poll_enrichment(&mut self) {
        let Some(rx) = &self.enrichment_rx else {
            return;
        };
        let (ticket, result) = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.enrichment_rx = None;
                self.enrichment.cancel();
                return;
            }
        };
        self.enrichment_rx = None;
        if !self.enrichment.accept(&ticket, self.hub_project.as_deref()) {
            return;
        }
        match result {
            Ok(enrichment) => {
                self.enrichment_result = Some((ticket.project_id, enrichment));
                self.status_message = "Brief enriched".to_string();
            }
            Err(e) => {
                self.status_message = format!("Failed to enrich brief: {e}");
            }
        }
    }

    // --- File operations ---

    pub fn save_workspace(&mut self) {
        match self.store.save_workspace(&self.workspace) {
            Ok(()) => {
                self.dirty = false;
                self.status_message = format!("Saved to {}", self.store.path().display());
            }
            Err(e) => {
                error!("save failed: {e}");
                self.status_message = format!("Error saving: {e}");
            }
        }
    }

    pub fn open_workspace(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("WorkHub Workspace", &["json"])
            .pick_file()
        {
            let store = JsonFileStore::new(&path);
            match store.load_workspace() {
                Ok(ws) => {
                    self.store = store;
                    self.replace_workspace(ws);
                    self.dirty = false;
                    self.settings.data_file = Some(path);
                    self.settings.save();
                    self.status_message = "Workspace loaded".to_string();
                }
                Err(e) => {
                    error!("open failed: {e}");
                    self.status_message = format!("Error loading: {e}");
                }
            }
        }
    }

    pub fn save_workspace_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("WorkHub Workspace", &["json"])
            .set_file_name("workspace.json")
            .save_file()
        {
            self.store = JsonFileStore::new(&path);
            self.settings.data_file = Some(path);
            self.settings.save();
            self.save_workspace();
        }
    }

    pub fn load_sample(&mut self) {
        self.replace_workspace(workhub::seed::sample_workspace());
        self.dirty = true;
        self.status_message = "Sample workspace loaded".to_string();
    }

    pub fn import_rates(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        else {
            return;
        };
        match csv_import::import_rates(&path) {
            Ok(import) => {
                let total = import.rows.len();
                let added = self.rates.upsert(import.rows);
                if let Err(e) = self.rates.save_to(&rates_path()) {
                    error!("failed to persist rate table: {e}");
                }
                self.status_message = if import.skipped > 0 {
                    format!(
                        "Imported {total} rates ({added} new, {} rows skipped)",
                        import.skipped
                    )
                } else {
                    format!("Imported {total} rates ({added} new)")
                };
            }
            Err(e) => {
                self.status_message = format!("CSV import failed: {e}");
            }
        }
    }

    pub fn generate_people(&mut self, project_id: &str, count: usize) {
        let people = csv_import::placeholder_people(self.rates.rows(), count, &mut self.ids);
        if people.is_empty() {
            self.status_message = "Rate table is empty. Import a rate card first.".to_string();
            return;
        }
        let n = people.len();
        for person in people {
            self.dispatch(Action::AddPerson {
                project_id: project_id.to_string(),
                person,
            });
        }
        self.status_message = format!("Generated {n} placeholder people");
    }

    pub fn export_tasks(&mut self, project_id: Option<&str>) {
        let tasks: Vec<_> = match project_id {
            Some(id) => self
                .indexes
                .project(id)
                .map(|p| p.tasks.iter().map(|t| t.as_ref()).collect())
                .unwrap_or_default(),
            None => self.workspace.tree.tasks().collect(),
        };
        if tasks.is_empty() {
            self.status_message = "Nothing to export, there are no tasks".to_string();
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("tasks.csv")
            .save_file()
        {
            match workhub::io::csv_export::export_tasks(
                &tasks,
                &self.indexes,
                &self.workspace.groups,
                &path,
            ) {
                Ok(count) => self.status_message = format!("Exported {count} tasks to CSV"),
                Err(e) => self.status_message = format!("CSV export failed: {e}"),
            }
        }
    }

    pub fn open_data_folder(&mut self) {
        let dir = self
            .store
            .path()
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(config::data_dir);
        if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| open::that(&dir)) {
            self.status_message = format!("Cannot open {}: {e}", dir.display());
        }
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        if self.granularity != granularity {
            self.granularity = granularity;
            self.settings.granularity = granularity;
            self.settings.save();
        }
    }
}

fn rates_path() -> std::path::PathBuf {
    config::data_dir().join("rates.json")
}

impl eframe::App for WorkHubApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);
        self.poll_enrichment();
        if self.enrichment.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }

        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        if should_save {
            self.save_workspace();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });
        if self.view.is_filtered() && !self.workspace.tree.is_empty() {
            egui::TopBottomPanel::top("client_filter").show(ctx, |ui| {
                ui::toolbar::show_client_filter(self, ui);
            });
        }

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_sub())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Projects: {} · People: {} · Highlighted: {}",
                                self.indexes.project_by_id.len(),
                                self.indexes.person_by_id.len(),
                                self.highlighted.len()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        if self.highlight.person_detail.is_some() {
            egui::SidePanel::right("person_detail")
                .default_width(ui::theme::SIDE_PANEL_WIDTH)
                .resizable(true)
                .frame(
                    egui::Frame::default()
                        .fill(ui::theme::BG_PANEL)
                        .inner_margin(egui::Margin::same(10.0))
                        .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
                )
                .show(ctx, |ui| {
                    ui::person_detail::show_person_detail(self, ui);
                });
        }

        let frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::same(8.0));
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| match self.view {
            View::OrgChart => ui::org_chart::show_org_chart(self, ui),
            View::Network => ui::network_view::show_network(self, ui),
            View::Timeline => ui::timeline_view::show_timeline(self, ui),
            View::Groups => ui::groups_view::show_groups(self, ui),
            View::Financials => ui::financials_view::show_financials(self, ui),
        });

        if self.hub_project.is_some() {
            ui::project_hub::show_project_hub(self, ctx);
        }
        if self.add_dialog.is_some() {
            ui::dialogs::show_add_dialog(self, ctx);
        }
        if self.import_people.is_some() {
            ui::dialogs::show_import_people_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
