//! Application settings.
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file
//! (`config/finance_tracker.toml`), then `FINANCE_TRACKER__*` environment
//! variables (e.g. `FINANCE_TRACKER__STORAGE__BACKEND=file`). The binary applies
//! command-line overrides on top.

use crate::error::Result;
use crate::storage::{FileSlot, KeyValueSlot, MemorySlot, SqliteSlot};
use crate::store::STORAGE_KEY;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/finance_tracker.toml";
pub const ENV_PREFIX: &str = "FINANCE_TRACKER";

const DEFAULT_SQLITE_PATH: &str = "data/finance.db";
const DEFAULT_FILE_DIR: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// SQLite database file, or directory for the file backend
    pub path: Option<PathBuf>,
    pub key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
            key: STORAGE_KEY.to_string(),
        }
    }
}

impl StorageSettings {
    pub fn resolved_path(&self) -> PathBuf {
        match (&self.path, self.backend) {
            (Some(path), _) => path.clone(),
            (None, StorageBackend::File) => PathBuf::from(DEFAULT_FILE_DIR),
            (None, _) => PathBuf::from(DEFAULT_SQLITE_PATH),
        }
    }

    /// Open the configured slot
    pub fn open_slot(&self) -> Result<Box<dyn KeyValueSlot>> {
        let slot: Box<dyn KeyValueSlot> = match self.backend {
            StorageBackend::Sqlite => Box::new(SqliteSlot::open(&self.resolved_path())?),
            StorageBackend::File => Box::new(FileSlot::new(self.resolved_path())),
            StorageBackend::Memory => Box::new(MemorySlot::new()),
        };
        Ok(slot)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    /// tracing filter directive, e.g. "info" or "finance_tracker=debug"
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings. A missing file at the default path is fine; an explicit
    /// path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}
