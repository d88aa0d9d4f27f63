// Configuration: YAML file layered under command-line flags

use crate::sqlite::SqliteStorage;
use crate::storage::{DEFAULT_KEY, FileStorage, Storage};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE: &str = "config.yaml";
const DB_FILE: &str = "todostore.db";

/// Where the slot lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per slot
    #[default]
    File,
    /// A row in a SQLite key-value table
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store_path: PathBuf,
    pub key: String,
    pub backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            key: DEFAULT_KEY.to_string(),
            backend: Backend::default(),
        }
    }
}

impl Config {
    /// Load the config file
    ///
    /// An explicit `path` must exist. Without one, the per-user config file
    /// is used when present, otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = ?path, ?config, "Loaded config file");
        Ok(config)
    }

    /// Open the storage slot this config points at
    pub fn open_storage(&self) -> Result<Box<dyn Storage>> {
        match self.backend {
            Backend::File => Ok(Box::new(FileStorage::open(&self.store_path, &self.key)?)),
            Backend::Sqlite => Ok(Box::new(SqliteStorage::open(self.store_path.join(DB_FILE), &self.key)?)),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("todostore"))
        .unwrap_or_else(|| PathBuf::from(".todostore"))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("todostore").join(CONFIG_FILE))
}
