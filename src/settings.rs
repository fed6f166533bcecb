//! User settings stored as settings.json in the app data directory

use crate::constants::{APP_NAME, DATE_FORMAT, DB_FILE_NAME, SETTINGS_FILE_NAME};
use crate::types::ListOrder;
use crate::view::is_valid_date_format;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Storage
    pub database_path: Option<String>,

    // Listing
    pub sort_by_due_date: bool,

    // Display
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            sort_by_due_date: false,
            date_format: DATE_FORMAT.to_string(),
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE_NAME);
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str::<Self>(&s) {
                Ok(mut settings) => {
                    if !is_valid_date_format(&settings.date_format) {
                        warn!(format = %settings.date_format, "Invalid date format, using default");
                        settings.date_format = DATE_FORMAT.to_string();
                    }
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn exists(data_dir: &Path) -> bool {
        data_dir.join(SETTINGS_FILE_NAME).exists()
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join(SETTINGS_FILE_NAME);
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    pub fn list_order(&self) -> ListOrder {
        if self.sort_by_due_date {
            ListOrder::DueDate
        } else {
            ListOrder::Store
        }
    }

    pub fn database_path_or_default(&self, data_dir: &Path) -> PathBuf {
        self.database_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME))
    }
}

/// Get the application data directory
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lendbook-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = scratch_dir("missing");
        assert_eq!(Settings::load(&dir), Settings::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("saved");
        let settings = Settings {
            database_path: Some("/tmp/loans.db".to_string()),
            sort_by_due_date: true,
            date_format: "%Y-%m-%d".to_string(),
        };
        settings.save(&dir);

        let loaded = Settings::load(&dir);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.list_order(), ListOrder::DueDate);
        assert_eq!(loaded.database_path_or_default(&dir), PathBuf::from("/tmp/loans.db"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_and_malformed_files() {
        let dir = scratch_dir("partial");
        std::fs::write(dir.join(SETTINGS_FILE_NAME), r#"{"sort_by_due_date": true}"#).unwrap();
        let loaded = Settings::load(&dir);
        assert!(loaded.sort_by_due_date);
        assert_eq!(loaded.date_format, DATE_FORMAT);
        assert_eq!(loaded.database_path_or_default(&dir), dir.join(DB_FILE_NAME));

        std::fs::write(dir.join(SETTINGS_FILE_NAME), "not json").unwrap();
        assert_eq!(Settings::load(&dir), Settings::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unrenderable_date_format_falls_back() {
        let dir = scratch_dir("bad-format");
        std::fs::write(
            dir.join(SETTINGS_FILE_NAME),
            r#"{"date_format": "%Q", "sort_by_due_date": true}"#,
        )
        .unwrap();

        let loaded = Settings::load(&dir);
        assert_eq!(loaded.date_format, DATE_FORMAT);
        assert!(loaded.sort_by_due_date);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_exists_after_first_save() {
        let dir = scratch_dir("first-run");
        assert!(!Settings::exists(&dir));
        Settings::default().save(&dir);
        assert!(Settings::exists(&dir));
        assert_eq!(Settings::load(&dir), Settings::default());
        std::fs::remove_dir_all(&dir).ok();
    }
}
