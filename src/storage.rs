//! Storage layer for weekplan
//!
//! All state lives in one data directory (default `.weekplan/`):
//!
//! ```text
//! .weekplan/
//!   weekplan.toml          # Configuration
//!   household.json         # Household snapshot (file name configurable)
//!   household.json.lock    # Advisory lock held by writers
//! ```
//!
//! Reads go straight to the snapshot. Writes run as a locked
//! read-modify-write and replace the snapshot atomically.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::lock::{self, FileLock};
use crate::snapshot::{Household, StoredHousehold};

/// Default data directory, relative to the current directory
pub const DEFAULT_DATA_DIR: &str = ".weekplan";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "WEEKPLAN_DIR";

/// Storage manager for one household
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    config: Config,
}

impl Storage {
    /// Opens `root`, reading `weekplan.toml` if present
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config = Config::load_from_dir(&root);
        Self { root, config }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn household_file(&self) -> PathBuf {
        self.root.join(&self.config.store.data_file)
    }

    pub fn lock_file(&self) -> PathBuf {
        lock::lock_path_for(&self.household_file())
    }

    /// Copy of the last snapshot that failed to parse.
    pub fn corrupt_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.corrupt", self.household_file().display()))
    }

    pub fn is_initialized(&self) -> bool {
        self.household_file().exists()
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Creates the data directory, config and snapshot where missing.
    ///
    /// Returns `false` when a snapshot already existed; it is left untouched.
    pub fn init(&self, seed: bool) -> Result<bool> {
        fs::create_dir_all(&self.root)?;

        let config_file = self.config_file();
        if !config_file.exists() {
            self.config.save(&config_file)?;
        }

        let _lock = FileLock::acquire(self.lock_file(), self.config.store.lock_timeout_ms)?;
        if self.is_initialized() {
            tracing::debug!(path = %self.household_file().display(), "household already initialized");
            return Ok(false);
        }

        let mut household = if seed {
            Household::with_defaults()
        } else {
            Household::default()
        };
        household.admin_code = self.config.household.admin_code.clone();
        self.save_household(&household)?;
        tracing::debug!(
            path = %self.household_file().display(),
            persons = household.persons.len(),
            tasks = household.tasks.len(),
            "initialized household"
        );
        Ok(true)
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    // =========================================================================
    // Household snapshot
    // =========================================================================

    /// Loads and normalizes the snapshot.
    ///
    /// A snapshot that is not valid JSON is replaced by an empty household so
    /// the planner stays usable. The unreadable file is first copied to
    /// [`Storage::corrupt_file`], since the next write overwrites it.
    pub fn load_household(&self) -> Result<Household> {
        let path = self.household_file();
        let stored = match self.read_json::<StoredHousehold>(&path) {
            Ok(stored) => stored,
            Err(Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotInitialized(self.root.clone()));
            }
            Err(Error::Json(err)) => {
                let backup = self.corrupt_file();
                fs::copy(&path, &backup)?;
                tracing::warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %err,
                    "unreadable snapshot, starting empty"
                );
                let mut household = Household::default();
                household.admin_code = self.config.household.admin_code.clone();
                return Ok(household);
            }
            Err(err) => return Err(err),
        };
        Ok(Household::from_stored(stored))
    }

    /// Writes the snapshot without locking; callers hold the lock.
    pub fn save_household(&self, household: &Household) -> Result<()> {
        let path = self.household_file();
        self.write_json(&path, &household.to_stored())?;
        tracing::debug!(path = %path.display(), completions = household.ledger.len(), "saved household");
        Ok(())
    }

    /// Locked read-modify-write of the snapshot.
    ///
    /// Nothing is written when `f` fails.
    pub fn update_household<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Household) -> Result<T>,
    {
        if !self.is_initialized() {
            return Err(Error::NotInitialized(self.root.clone()));
        }

        let _lock = FileLock::acquire(self.lock_file(), self.config.store.lock_timeout_ms)?;
        let mut household = self.load_household()?;
        let result = f(&mut household)?;
        self.save_household(&household)?;
        Ok(result)
    }
}
