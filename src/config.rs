// YAML configuration

use crate::export::DEFAULT_APP_VERSION;
use crate::storage::{FileStorage, MemoryStorage, SqliteStorage, Storage};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which storage backend holds the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per key
    #[default]
    File,
    Sqlite,
    /// Nothing survives the process; useful for trying things out
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub backend: Backend,

    /// Days ahead counted as "due soon"
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,

    /// Seed sample tasks on first run
    #[serde(default = "default_true")]
    pub seed_samples: bool,

    /// Written as `appVersion` in exports
    #[serde(default = "default_app_version")]
    pub app_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: Backend::default(),
            due_soon_days: default_due_soon_days(),
            seed_samples: default_true(),
            app_version: default_app_version(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tasklist"))
        .unwrap_or_else(|| PathBuf::from(".tasklist"))
}

fn default_due_soon_days() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

fn default_app_version() -> String {
    DEFAULT_APP_VERSION.to_string()
}

impl Config {
    /// `<config dir>/tasklist/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tasklist").join("config.yaml"))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse config")
    }

    /// Load from an explicit path (which must exist), or from the default
    /// path when present, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(eyre!("Config file not found: {:?}", p));
                }
                p.to_path_buf()
            }
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(path = ?path, "Loading config");
        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    /// Open the configured backend under `data_dir`
    pub fn open_storage(&self) -> Result<Box<dyn Storage>> {
        let storage: Box<dyn Storage> = match self.backend {
            Backend::File => Box::new(FileStorage::open(&self.data_dir)?),
            Backend::Sqlite => Box::new(SqliteStorage::open(&self.data_dir)?),
            Backend::Memory => Box::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}
