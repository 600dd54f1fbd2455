// Configuration loaded from YAML, every field defaulted

use crate::clock::Locale;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage key holding the serialized note list
pub const DEFAULT_KEY: &str = "anotacoes_do_app";

const APP_DIR: &str = "notestore";
const CONFIG_FILE: &str = "notestore.yml";

/// What `update` does when the id is not in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownIdPolicy {
    /// Return the unchanged list without writing
    #[default]
    Ignore,
    /// Fail with `NoteError::NotFound`
    Reject,
}

/// Settings that govern the note store itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub key: String,
    pub locale: Locale,
    pub unknown_update: UnknownIdPolicy,
    /// Copy an unreadable blob to `{key}.corrupt` before it can be overwritten
    pub preserve_corrupt: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            locale: Locale::default(),
            unknown_update: UnknownIdPolicy::default(),
            preserve_corrupt: true,
        }
    }
}

impl StoreConfig {
    pub fn corrupt_key(&self) -> String {
        format!("{}.corrupt", self.key)
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted notes
    pub data_dir: PathBuf,
    #[serde(flatten)]
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or the default location if present, else defaults
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
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
