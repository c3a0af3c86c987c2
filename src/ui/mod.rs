pub mod dialogs;
pub mod financials_view;
pub mod groups_view;
pub mod network_view;
pub mod org_chart;
pub mod person_detail;
pub mod project_hub;
pub mod theme;
pub mod timeline_view;
pub mod toolbar;
