//! Configuration management for aidplanner.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::planner::SchedulePolicy;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "aidplanner";

/// Default sessions table file name.
const SESSIONS_FILE_NAME: &str = "sessions.csv";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "sessions.db";

/// Default pattern for volunteer identifiers.
const DEFAULT_ID_PATTERN: &str = r"^[A-Za-z0-9_.-]+$";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `AIDPLANNER_`)
/// 2. TOML config file at `~/.config/aidplanner/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Scheduling rules.
    pub schedule: SchedulePolicy,
    /// Volunteer reference data.
    pub volunteers: VolunteerConfig,
}

/// Which session store to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Delimited text table, rewritten whole on every change.
    #[default]
    FlatFile,
    /// `SQLite` database.
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FlatFile => write!(f, "flat_file"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which store holds booked sessions.
    pub backend: StorageBackend,
    /// Path to the sessions table.
    /// Defaults to `~/.local/share/aidplanner/sessions.csv`
    pub sessions_path: Option<PathBuf>,
    /// Path to the database file.
    /// Defaults to `~/.local/share/aidplanner/sessions.db`
    pub database_path: Option<PathBuf>,
}

/// Volunteer reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolunteerConfig {
    /// Regex every volunteer identifier must match.
    pub id_pattern: String,
}

impl Default for VolunteerConfig {
    fn default() -> Self {
        Self {
            id_pattern: DEFAULT_ID_PATTERN.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `AIDPLANNER_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("AIDPLANNER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()?;

        if regex::Regex::new(&self.volunteers.id_pattern).is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid regex pattern: {}", self.volunteers.id_pattern),
            });
        }

        Ok(())
    }

    /// Get the sessions table path, resolving defaults if not set.
    #[must_use]
    pub fn sessions_path(&self) -> PathBuf {
        self.storage
            .sessions_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(SESSIONS_FILE_NAME))
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Path of whichever store the backend setting selects.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        match self.storage.backend {
            StorageBackend::FlatFile => self.sessions_path(),
            StorageBackend::Sqlite => self.database_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.backend, StorageBackend::FlatFile);
        assert_eq!(config.schedule, SchedulePolicy::default());
        assert_eq!(config.volunteers.id_pattern, DEFAULT_ID_PATTERN);
    }

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.sessions_path.is_none());
        assert!(storage.database_path.is_none());
        assert_eq!(storage.backend, StorageBackend::FlatFile);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_schedule() {
        let mut config = Config::default();
        config.schedule.slot_minutes = 45;
        config.schedule.max_session_minutes = 300;

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("max_session_minutes"));
    }

    #[test]
    fn test_validate_invalid_regex() {
        let mut config = Config::default();
        config.volunteers.id_pattern = "[invalid".to_string();

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid regex"));
    }

    #[test]
    fn test_sessions_path_default() {
        let config = Config::default();
        let path = config.sessions_path();

        assert!(path.to_string_lossy().contains("sessions.csv"));
        assert_eq!(config.store_path(), path);
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
        assert_eq!(config.store_path(), PathBuf::from("/custom/path/db.sqlite"));
    }

    #[test]
    fn test_storage_backend_display() {
        assert_eq!(StorageBackend::FlatFile.to_string(), "flat_file");
        assert_eq!(StorageBackend::Sqlite.to_string(), "sqlite");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("aidplanner"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("aidplanner"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "aidplanner_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[storage]\nbackend = \"sqlite\"\n\n[schedule]\nhorizon_days = 7\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.schedule.horizon_days, 7);
        assert_eq!(config.schedule.slot_minutes, 30);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!(
            "aidplanner_bad_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[schedule]\nslot_minutes = 0\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_reads_every_section() {
        let path = std::env::temp_dir().join(format!(
            "aidplanner_sections_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[storage]\nsessions_path = \"/srv/aid/sessions.csv\"\n\n\
             [schedule]\nbuffer_minutes = 90\n\n\
             [volunteers]\nid_pattern = \"^V[0-9]+$\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(
            config.sessions_path(),
            PathBuf::from("/srv/aid/sessions.csv")
        );
        assert_eq!(config.schedule.buffer_minutes, 90);
        assert_eq!(config.volunteers.id_pattern, "^V[0-9]+$");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_validate_rejects_unbounded_horizon() {
        let mut config = Config::default();
        config.schedule.horizon_days = u32::MAX;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
        assert!(err.to_string().contains("horizon_days"));
    }

    #[test]
    fn test_schedule_deserialize() {
        let json = r#"{"schedule": {"buffer_minutes": 90}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.schedule.buffer_minutes, 90);
        assert_eq!(config.schedule.max_session_minutes, 300);
    }

    #[test]
    fn test_storage_backend_deserialize() {
        let json = r#"{"backend": "sqlite"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("flat_file"));
        assert!(json.contains("horizon_days"));
        assert!(json.contains("id_pattern"));
    }
}
