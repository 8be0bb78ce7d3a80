//! Reserved vault settings directory.
//!
//! A vault carries a `.obsidian/app.json` file with link and ignore
//! preferences. The directory is created on initialization and never scanned.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the reserved settings directory inside a vault.
pub const CONFIG_DIR: &str = ".obsidian";

/// Settings file inside [`CONFIG_DIR`].
pub const SETTINGS_FILE: &str = "app.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("vault root does not exist: {0}")]
    MissingRoot(String),

    #[error("failed to write {0}: {1}")]
    WriteError(String, #[source] std::io::Error),

    #[error("failed to read {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("invalid settings JSON in {0}: {1}")]
    ParseError(String, #[source] serde_json::Error),
}

/// Contents of the vault settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultSettings {
    #[serde(default = "default_link_format")]
    pub new_link_format: String,
    #[serde(default = "default_attachment_folder")]
    pub attachment_folder_path: String,
    /// Folder prefixes excluded from scanning.
    #[serde(default)]
    pub user_ignore_filters: Vec<String>,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            new_link_format: default_link_format(),
            attachment_folder_path: default_attachment_folder(),
            user_ignore_filters: Vec::new(),
        }
    }
}

fn default_link_format() -> String {
    "shortest".to_string()
}

fn default_attachment_folder() -> String {
    "attachments".to_string()
}

impl VaultSettings {
    /// Path of the settings file for a vault root.
    pub fn path(vault_root: &Path) -> PathBuf {
        vault_root.join(CONFIG_DIR).join(SETTINGS_FILE)
    }

    /// Load settings for a vault, using defaults when the file is absent.
    pub fn load(vault_root: &Path) -> Result<Self, SettingsError> {
        let path = Self::path(vault_root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .map_err(|e| SettingsError::ReadError(path.display().to_string(), e))?;
        serde_json::from_str(&raw)
            .map_err(|e| SettingsError::ParseError(path.display().to_string(), e))
    }

    /// Ignore filters as folder exclusions for the walker.
    pub fn excluded_folders(&self) -> Vec<PathBuf> {
        self.user_ignore_filters
            .iter()
            .map(|f| f.trim_matches('/'))
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

/// Initialize a vault: create the settings directory and default `app.json`.
///
/// An existing settings file is loaded and returned untouched.
pub fn init_vault(vault_root: &Path) -> Result<VaultSettings, SettingsError> {
    if !vault_root.is_dir() {
        return Err(SettingsError::MissingRoot(vault_root.display().to_string()));
    }

    let path = VaultSettings::path(vault_root);
    if path.exists() {
        return VaultSettings::load(vault_root);
    }

    let dir = vault_root.join(CONFIG_DIR);
    fs::create_dir_all(&dir)
        .map_err(|e| SettingsError::WriteError(dir.display().to_string(), e))?;

    let settings = VaultSettings::default();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| SettingsError::ParseError(path.display().to_string(), e))?;
    fs::write(&path, json)
        .map_err(|e| SettingsError::WriteError(path.display().to_string(), e))?;

    tracing::info!("initialized vault settings at {}", path.display());
    Ok(settings)
}
