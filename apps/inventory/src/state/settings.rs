//! # Process Settings
//!
//! How this process stores things, decided once at startup.
//!
//! ## Sources (Priority Order)
//! 1. Environment variables (`STOCKROOM_*`)
//! 2. Defaults (this file)
//!
//! User-editable values (credentials, language) live in the config file
//! instead; see [`stockroom_files::ConfigStore`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use stockroom_db::DbConfig;

use crate::error::AppError;

pub const DATA_DIR_VAR: &str = "STOCKROOM_DATA_DIR";
pub const STORAGE_VAR: &str = "STOCKROOM_STORAGE";
pub const CONNECT_TIMEOUT_VAR: &str = "STOCKROOM_CONNECT_TIMEOUT_SECS";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Storage Mode
// =============================================================================

/// Where items and activity are kept.
///
/// ```text
/// ┌────────────┬──────────────────────────┬────────────────────────────┐
/// │ Mode       │ Items                    │ Activity                   │
/// ├────────────┼──────────────────────────┼────────────────────────────┤
/// │ Database   │ record store (+ CSV copy)│ logs table                 │
/// │ FlatFile   │ inventory.csv            │ inventory.log              │
/// └────────────┴──────────────────────────┴────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageMode {
    #[default]
    Database,
    FlatFile,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Database => write!(f, "database"),
            StorageMode::FlatFile => write!(f, "file"),
        }
    }
}

impl FromStr for StorageMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "database" | "db" => Ok(StorageMode::Database),
            "file" | "flatfile" | "csv" => Ok(StorageMode::FlatFile),
            _ => Err(AppError::InvalidSetting(format!(
                "Invalid storage mode: '{}'. Valid options: database, file",
                s
            ))),
        }
    }
}

// =============================================================================
// App Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    /// Directory holding config.json, inventory.db, inventory.csv and
    /// inventory.log.
    pub data_dir: PathBuf,

    pub storage: StorageMode,

    /// Bound on one networked connect attempt.
    pub connect_timeout: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage: StorageMode::Database,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl AppSettings {
    /// Settings rooted at `data_dir`, everything else default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        AppSettings {
            data_dir: data_dir.into(),
            ..AppSettings::default()
        }
    }

    pub fn storage(mut self, storage: StorageMode) -> Self {
        self.storage = storage;
        self
    }

    /// Creates settings from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `STOCKROOM_DATA_DIR`: data directory (default `data`)
    /// - `STOCKROOM_STORAGE`: `database` or `file` (default `database`)
    /// - `STOCKROOM_CONNECT_TIMEOUT_SECS`: networked connect bound (default 5)
    ///
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) over any variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = AppSettings::default();

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            settings.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(STORAGE_VAR) {
            match raw.parse::<StorageMode>() {
                Ok(mode) => settings.storage = mode,
                Err(e) => warn!(error = %e, "Ignoring {}", STORAGE_VAR),
            }
        }

        if let Some(raw) = lookup(CONNECT_TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => settings.connect_timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "Ignoring {}", CONNECT_TIMEOUT_VAR),
            }
        }

        settings
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("inventory.db")
    }

    pub fn mirror_path(&self) -> PathBuf {
        self.data_dir.join("inventory.csv")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("inventory.log")
    }

    /// Record store configuration for these settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path()).connect_timeout(self.connect_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]);

        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.config_path(), PathBuf::from("data/config.json"));
        assert_eq!(settings.database_path(), PathBuf::from("data/inventory.db"));
        assert_eq!(settings.mirror_path(), PathBuf::from("data/inventory.csv"));
        assert_eq!(settings.log_path(), PathBuf::from("data/inventory.log"));
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            (DATA_DIR_VAR, "/srv/stock"),
            (STORAGE_VAR, "File"),
            (CONNECT_TIMEOUT_VAR, "2"),
        ]);

        assert_eq!(settings.storage, StorageMode::FlatFile);
        assert_eq!(settings.connect_timeout, Duration::from_secs(2));
        assert_eq!(settings.log_path(), PathBuf::from("/srv/stock/inventory.log"));
        assert_eq!(settings.db_config().connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let settings = settings_from(&[(STORAGE_VAR, "cloud"), (CONNECT_TIMEOUT_VAR, "0")]);

        assert_eq!(settings.storage, StorageMode::Database);
        assert_eq!(settings.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn test_storage_mode_round_trip() {
        for mode in [StorageMode::Database, StorageMode::FlatFile] {
            assert_eq!(mode.to_string().parse::<StorageMode>().unwrap(), mode);
        }
        assert!("cloud".parse::<StorageMode>().is_err());
    }
}
