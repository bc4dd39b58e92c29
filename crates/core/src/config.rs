//! Application configuration.
//!
//! Values are layered: built-in defaults, then the JSON file under the
//! user's config directory, then `EVENTDESK_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Directory under `~/.config` holding the config file.
pub const CONFIG_DIR: &str = "eventdesk";
/// Config file name.
pub const CONFIG_FILE: &str = "config.json";
/// Prefix for environment overrides, e.g. `EVENTDESK_DATA_DIR`.
pub const ENV_PREFIX: &str = "EVENTDESK";

/// Runtime settings for the booking desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the data files.
    pub data_dir: PathBuf,
    /// Event file name, relative to `data_dir`.
    pub events_file: String,
    /// Customer file name, relative to `data_dir`.
    pub customers_file: String,
    /// Directory for log output.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            events_file: "event_data.txt".to_string(),
            customers_file: "customer_data.txt".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load from the default config path with environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path` (optional) with environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(path.as_ref(), Environment::with_prefix(ENV_PREFIX))
    }

    fn build(path: &Path, environment: Environment) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("data_dir", path_value(&defaults.data_dir))?
            .set_default("events_file", defaults.events_file)?
            .set_default("customers_file", defaults.customers_file)?
            .set_default("log_dir", path_value(&defaults.log_dir))?
            .add_source(
                File::from(path)
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(environment)
            .build()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// Full path of the event file.
    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join(&self.events_file)
    }

    /// Full path of the customer file.
    pub fn customers_path(&self) -> PathBuf {
        self.data_dir.join(&self.customers_file)
    }
}

/// Default location of the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a default config file if none exists and return its path.
pub fn ensure_default_config() -> Result<PathBuf> {
    ensure_default_config_at(config_path())
}

/// Write a default config file at `path` unless one is already there.
pub fn ensure_default_config_at(path: impl Into<PathBuf>) -> Result<PathBuf> {
    let path = path.into();
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(&path, serialized)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(path)
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn isolated_env() -> Environment {
        Environment::with_prefix("EVENTDESK_TEST_UNSET")
    }

    #[test]
    fn defaults_apply_without_a_file() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::build(&dir.path().join("missing.json"), isolated_env())?;
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.events_path(), PathBuf::from("./event_data.txt"));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{ "data_dir": "/srv/desk", "customers_file": "people.txt" }"#,
        )?;

        let config = AppConfig::build(&path, isolated_env())?;
        assert_eq!(config.data_dir, PathBuf::from("/srv/desk"));
        assert_eq!(config.customers_path(), PathBuf::from("/srv/desk/people.txt"));
        assert_eq!(config.events_file, "event_data.txt");
        Ok(())
    }

    #[test]
    fn default_config_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);

        ensure_default_config_at(&path)?;
        let written: AppConfig = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(written, AppConfig::default());

        fs::write(&path, r#"{ "log_dir": "/tmp/custom" }"#)?;
        ensure_default_config_at(&path)?;
        let config = AppConfig::build(&path, isolated_env())?;
        assert_eq!(config.log_dir, PathBuf::from("/tmp/custom"));
        Ok(())
    }
}
