//! Error types shared by the core and its collaborators.

use thiserror::Error;

/// Structural errors in the work tree or in a dispatched action.
///
/// These are not recoverable locally: the operation that raised one is
/// abandoned and the error is handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("malformed tree at {path}: {reason}")]
    MalformedTree { path: String, reason: String },

    #[error("unknown action type: {0}")]
    UnknownAction(String),

    #[error("invalid {action} action: {reason}")]
    InvalidAction { action: String, reason: String },
}

impl ModelError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failures of the document store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Malformed(#[from] ModelError),
}

/// Why a settings file was not used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the text-enrichment service.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("project brief is empty")]
    EmptyBrief,

    #[error("no API key found in ${0}")]
    MissingApiKey(String),

    #[error("enrichment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("enrichment service returned status {0}")]
    Status(u16),

    #[error("malformed enrichment payload: {0}")]
    MalformedPayload(String),
}

/// Failures of the bulk CSV importer.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no valid rows found ({0} rows skipped)")]
    NoRows(usize),
}
