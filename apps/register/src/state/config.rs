//! # Configuration State
//!
//! Register configuration loaded at startup.
//!
//! ## Configuration Sources (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`register.toml`)
//! 3. Environment variables (`RETREAT_*`)
//!
//! Configuration is read-only after startup, so no lock is needed.
//!
//! ## Example `register.toml`
//! ```toml
//! store_name = "St. Brigid Retreat Bookstore"
//! database_path = "/var/lib/retreat/retreat.db"
//! export_dir = "/home/volunteer/exports"
//! utc_offset_minutes = -300
//! ```

use std::path::{Path, PathBuf};

use retreat_core::report::CsvReporter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Largest offset a real time zone uses, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Register configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Store name shown in command output
    pub store_name: String,

    /// SQLite file; the platform data directory when unset
    pub database_path: Option<PathBuf>,

    /// Where exported CSV files are written; the OS temp dir when unset
    pub export_dir: Option<PathBuf>,

    /// Offset applied to receipt timestamps in the detailed CSV
    pub utc_offset_minutes: i32,
}

impl Default for ConfigState {
    /// Defaults suitable for a single register: UTC timestamps and
    /// platform data directories.
    fn default() -> Self {
        ConfigState {
            store_name: "Retreat Bookstore".to_string(),
            database_path: None,
            export_dir: None,
            utc_offset_minutes: 0,
        }
    }
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// A missing file is not an error; a file that exists but does not
    /// parse is.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading register config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Rejects offsets no time zone uses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes must be within ±{}, got {}",
                MAX_UTC_OFFSET_MINUTES, self.utc_offset_minutes
            )));
        }

        if self.store_name.trim().is_empty() {
            return Err(ConfigError::Invalid("store_name must not be empty".into()));
        }

        Ok(())
    }

    /// Applies `RETREAT_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("RETREAT_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(path) = lookup("RETREAT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(dir) = lookup("RETREAT_EXPORT_DIR") {
            self.export_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup("RETREAT_UTC_OFFSET_MINUTES") {
            match raw.trim().parse::<i32>() {
                Ok(minutes) => self.utc_offset_minutes = minutes,
                Err(_) => warn!(value = %raw, "Ignoring non-numeric RETREAT_UTC_OFFSET_MINUTES"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "retreat", "pos")
            .map(|dirs| dirs.config_dir().join("register.toml"))
    }

    pub fn export_dir_or_default(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Reporter that renders timestamps at the configured offset.
    pub fn reporter(&self) -> CsvReporter {
        CsvReporter::with_offset_minutes(self.utc_offset_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ConfigState::default();
        assert_eq!(config.store_name, "Retreat Bookstore");
        assert_eq!(config.utc_offset_minutes, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("register.toml");
        std::fs::write(
            &path,
            "store_name = \"Abbey Shop\"\nexport_dir = \"/tmp/out\"\nutc_offset_minutes = 60\n",
        )
        .unwrap();

        let config = ConfigState::load(Some(path)).unwrap();
        assert_eq!(config.store_name, "Abbey Shop");
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.utc_offset_minutes, 60);
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigState::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.store_name, ConfigState::default().store_name);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("register.toml");
        std::fs::write(&path, "store_name = [").unwrap();

        assert!(matches!(ConfigState::load(Some(path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ConfigState::default();
        config.apply_overrides(lookup_from(&[
            ("RETREAT_STORE_NAME", "Chapel Table"),
            ("RETREAT_DB_PATH", "/data/r.db"),
            ("RETREAT_UTC_OFFSET_MINUTES", "-300"),
        ]));

        assert_eq!(config.store_name, "Chapel Table");
        assert_eq!(config.database_path, Some(PathBuf::from("/data/r.db")));
        assert_eq!(config.utc_offset_minutes, -300);
    }

    #[test]
    fn test_bad_offset_override_is_ignored() {
        let mut config = ConfigState::default();
        config.apply_overrides(lookup_from(&[("RETREAT_UTC_OFFSET_MINUTES", "east")]));
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn test_validation() {
        let config = ConfigState {
            utc_offset_minutes: 15 * 60,
            ..ConfigState::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ConfigState {
            store_name: "  ".into(),
            ..ConfigState::default()
        };
        assert!(config.validate().is_err());
    }
}
