//! Configuration loading and management
//!
//! Handles parsing of `weekplan.toml` inside the data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::snapshot::DEFAULT_ADMIN_CODE;

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "weekplan.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot storage settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Household defaults
    #[serde(default)]
    pub household: HouseholdConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file, relative to the data directory
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// How long writers wait for the snapshot lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_data_file() -> String {
    "household.json".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdConfig {
    /// Seed sample persons and chores on `weekplan init`
    #[serde(default = "default_true")]
    pub seed_defaults: bool,

    /// Parent code written into new snapshots
    #[serde(default = "default_admin_code")]
    pub admin_code: String,
}

fn default_true() -> bool {
    true
}

fn default_admin_code() -> String {
    DEFAULT_ADMIN_CODE.to_string()
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            seed_defaults: default_true(),
            admin_code: default_admin_code(),
        }
    }
}

impl Config {
    /// Load configuration from a `weekplan.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a data directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.household.validate()?;
        Ok(())
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        let file = self.data_file.trim();
        if file.is_empty() {
            return Err(Error::InvalidConfig(
                "store.data_file cannot be empty".to_string(),
            ));
        }
        if Path::new(file).is_absolute() || file.split(['/', '\\']).any(|part| part == "..") {
            return Err(Error::InvalidConfig(
                "store.data_file must stay inside the data directory".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "store.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl HouseholdConfig {
    fn validate(&self) -> Result<()> {
        if self.admin_code.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "household.admin_code cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.store.data_file, "household.json");
        assert_eq!(cfg.store.lock_timeout_ms, 5000);
        assert!(cfg.household.seed_defaults);
        assert_eq!(cfg.household.admin_code, "parent");
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[store]
data_file = "family.json"
lock_timeout_ms = 250

[household]
seed_defaults = false
admin_code = "1234"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.store.data_file, "family.json");
        assert_eq!(cfg.store.lock_timeout_ms, 250);
        assert!(!cfg.household.seed_defaults);
        assert_eq!(cfg.household.admin_code, "1234");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[household]\nseed_defaults = false").expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert!(!cfg.household.seed_defaults);
        assert_eq!(cfg.store.data_file, "household.json");
    }

    #[test]
    fn invalid_store_config_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        for content in [
            "[store]\ndata_file = \"\"",
            "[store]\ndata_file = \"../outside.json\"",
            "[store]\nlock_timeout_ms = 0",
            "[household]\nadmin_code = \"  \"",
        ] {
            fs::write(&path, content).expect("write config");
            match Config::load(&path).expect_err("invalid config") {
                Error::InvalidConfig(_) => {}
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn load_from_dir_defaults_when_missing_or_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(Config::load_from_dir(dir.path()).store.data_file, "household.json");

        fs::write(dir.path().join(CONFIG_FILE), "[store]\nlock_timeout_ms = 0").expect("write");
        assert_eq!(Config::load_from_dir(dir.path()).store.lock_timeout_ms, 5000);
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("data_file = \"household.json\""));
        assert!(written.contains("[household]"));
        let reloaded = Config::load(&path).expect("reload");
        assert_eq!(reloaded.household.admin_code, "parent");
    }
}
