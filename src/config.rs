//! User settings, persisted in the OS config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SettingsError;
use crate::timeline::Granularity;

const APP_NAME: &str = "WorkHub";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key. The key itself
    /// is never written to disk.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-2.5-flash".into(),
            api_key_env: "WORKHUB_API_KEY".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Workspace document; `None` means the default location in the data dir.
    pub data_file: Option<PathBuf>,
    pub granularity: Granularity,
    pub log_level: String,
    pub enrichment: EnrichmentSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_file: None,
            granularity: Granularity::Day,
            log_level: "info".into(),
            enrichment: EnrichmentSettings::default(),
        }
    }
}

impl AppSettings {
    /// Read settings from the default location. A missing file gives the
    /// defaults. An unreadable one gives the defaults plus the reason, so the
    /// caller can report it once logging is up.
    pub fn load_or_default() -> (Self, Option<SettingsError>) {
        let path = settings_path();
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::read_from(&path) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn read_from(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Unreadable or invalid files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        Self::read_from(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "ignoring settings: {e}");
            Self::default()
        })
    }

    pub fn save(&self) {
        self.save_to(&settings_path());
    }

    pub fn save_to(&self, path: &Path) {
        let result = serde_json::to_string_pretty(self)
            .map_err(std::io::Error::other)
            .and_then(|json| {
                if let Some(dir) = path.parent() {
                    std::fs::create_dir_all(dir)?;
                }
                std::fs::write(path, json)
            });
        if let Err(e) = result {
            warn!(path = %path.display(), "failed to save settings: {e}");
        }
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| data_dir().join("workspace.json"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

pub fn settings_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("settings.json")
}

pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "granularity": "month", "enrichment": { "timeout_secs": 5 } }"#)
            .unwrap();

        let settings = AppSettings::load_from(&path);
        assert_eq!(settings.granularity, Granularity::Month);
        assert_eq!(settings.enrichment.timeout_secs, 5);
        assert_eq!(settings.enrichment.api_key_env, "WORKHUB_API_KEY");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn read_reports_why_the_file_was_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let missing = AppSettings::read_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, SettingsError::Io(_)));

        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "granularity": "fortnight" }"#).unwrap();
        assert!(matches!(AppSettings::read_from(&path), Err(SettingsError::Json(_))));
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            log_level: "debug".into(),
            ..Default::default()
        };
        settings.save_to(&path);
        assert_eq!(AppSettings::load_from(&path), settings);
    }
}
