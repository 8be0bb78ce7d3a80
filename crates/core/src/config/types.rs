use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::index::http::DEFAULT_TIMEOUT_SECS;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub vault_root: String,
    /// Index namespace the vault's documents are stored under.
    #[serde(default = "default_scope")]
    pub namespace: String,
    #[serde(default = "default_scope")]
    pub tenant: String,
    /// Where sync state is kept (defaults to `{{vault_root}}/.vaultgraph`).
    pub state_dir: Option<String>,
    /// Folders to exclude from scanning (relative to vault_root).
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

fn default_scope() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    Http,
    /// Process-local index, rebuilt from stored state on every run.
    #[default]
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default)]
    pub backend: IndexBackend,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            url: None,
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub vault_root: PathBuf,
    pub namespace: String,
    pub tenant: String,
    pub state_dir: PathBuf,
    /// Folders to exclude from scanning (resolved to absolute paths).
    pub excluded_folders: Vec<PathBuf>,
    pub index: IndexConfig,
    pub logging: LoggingConfig,
}

impl ResolvedConfig {
    /// Path of the sync state database.
    pub fn state_db_path(&self) -> PathBuf {
        self.state_dir.join(crate::store::STATE_DB)
    }
}
