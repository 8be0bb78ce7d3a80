//! Recursive vault directory walker.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

use super::settings::CONFIG_DIR;

#[derive(Debug, Error)]
pub enum VaultWalkerError {
    #[error("vault root does not exist: {0}")]
    MissingRoot(String),

    #[error("failed to walk vault directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),
}

/// Information about a discovered markdown file.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Absolute path to the file.
    pub absolute_path: PathBuf,
    /// Vault-relative path with `/` separators; the key used everywhere else.
    pub path: String,
    /// File modification time at scan.
    pub modified: SystemTime,
}

/// An entry below the root that could not be listed or stat'ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFailure {
    /// Vault-relative path of the file or directory.
    pub path: String,
    pub message: String,
}

/// Result of one walk: the files found plus the entries that failed.
#[derive(Debug, Clone, Default)]
pub struct VaultScan {
    pub files: Vec<WalkedFile>,
    pub failures: Vec<WalkFailure>,
}

/// Walker for discovering markdown files in a vault.
#[derive(Debug, Clone)]
pub struct VaultWalker {
    root: PathBuf,
    /// Folders to exclude from walking (relative paths from vault root).
    excluded_folders: Vec<PathBuf>,
}

impl VaultWalker {
    /// Create a new walker for the given vault root.
    pub fn new(root: &Path) -> Result<Self, VaultWalkerError> {
        Self::with_exclusions(root, Vec::new())
    }

    /// Create a new walker with folder exclusions.
    ///
    /// Excluded folders can be specified as:
    /// - Relative paths from vault root (e.g., "archive/2020")
    /// - Absolute paths (will be converted to relative)
    pub fn with_exclusions(
        root: &Path,
        excluded_folders: Vec<PathBuf>,
    ) -> Result<Self, VaultWalkerError> {
        let root = root
            .canonicalize()
            .map_err(|_| VaultWalkerError::MissingRoot(root.display().to_string()))?;

        if !root.is_dir() {
            return Err(VaultWalkerError::MissingRoot(root.display().to_string()));
        }

        let excluded_folders = excluded_folders
            .into_iter()
            .map(|p| {
                if p.is_absolute() {
                    let canonical = p.canonicalize().unwrap_or_else(|_| p.clone());
                    canonical
                        .strip_prefix(&root)
                        .or_else(|_| p.strip_prefix(&root))
                        .map(Path::to_path_buf)
                        .unwrap_or(p)
                } else {
                    p
                }
            })
            .collect();

        Ok(Self { root, excluded_folders })
    }

    /// Walk the vault and return all markdown files, sorted by vault path.
    ///
    /// Skips the reserved settings directory, hidden entries, common
    /// non-vault directories and configured exclusions. Only a failure on
    /// the root itself is an error; entries that vanish mid-walk are
    /// skipped and other per-entry errors land in [`VaultScan::failures`].
    pub fn walk(&self) -> Result<VaultScan, VaultWalkerError> {
        let mut scan = VaultScan::default();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(VaultWalkerError::WalkError(self.root.display().to_string(), e));
                }
                Err(e) => {
                    let path = e.path().map(|p| self.relative(p)).unwrap_or_default();
                    let vanished = e.io_error().is_some_and(|io| io.kind() == ErrorKind::NotFound);
                    self.skip_entry(&mut scan, path, vanished, e.to_string());
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    let vanished = e.io_error().is_some_and(|io| io.kind() == ErrorKind::NotFound);
                    self.skip_entry(&mut scan, self.relative(path), vanished, e.to_string());
                    continue;
                }
            };

            scan.files.push(WalkedFile {
                absolute_path: path.to_path_buf(),
                path: self.relative(path),
                modified: metadata.modified().unwrap_or(std::time::UNIX_EPOCH),
            });
        }

        scan.files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(scan)
    }

    fn skip_entry(&self, scan: &mut VaultScan, path: String, vanished: bool, message: String) {
        if vanished {
            tracing::warn!("{path} disappeared during scan");
        } else {
            tracing::warn!("Failed to scan {path}: {message}");
            scan.failures.push(WalkFailure { path, message });
        }
    }

    fn relative(&self, path: &Path) -> String {
        vault_path(path.strip_prefix(&self.root).unwrap_or(path))
    }

    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        // Never filter the root directory (depth 0)
        if entry.depth() == 0 {
            return false;
        }

        let name = entry.file_name().to_string_lossy();

        if name == CONFIG_DIR || name.starts_with('.') {
            return true;
        }

        if matches!(name.as_ref(), "node_modules" | "target" | "__pycache__" | "venv") {
            return true;
        }

        if self.excluded_folders.is_empty() {
            return false;
        }

        match entry.path().strip_prefix(&self.root) {
            Ok(relative) => self.excluded_folders.iter().any(|ex| relative.starts_with(ex)),
            Err(_) => false,
        }
    }

    /// Get the (canonical) vault root path.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Render a vault-relative path with `/` separators regardless of platform.
pub fn vault_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e == "md")
}
