//! Vault change detection.
//!
//! [`FileStateTracker`] remembers the content and modification time of every
//! file it has read and classifies each scan into added, modified and deleted
//! paths.

mod types;

pub use types::{DiffOutcome, FileState, ReadFailure, SyncReport};

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::vault::{VaultScan, VaultWalker, VaultWalkerError};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Vault walker error: {0}")]
    Walker(#[from] VaultWalkerError),
}

/// Cache of previously seen vault files plus the walker that enumerates them.
#[derive(Debug)]
pub struct FileStateTracker {
    walker: VaultWalker,
    cache: BTreeMap<String, FileState>,
}

impl FileStateTracker {
    /// Create a tracker with an empty cache.
    pub fn new(walker: VaultWalker) -> Self {
        Self { walker, cache: BTreeMap::new() }
    }

    /// Create a tracker seeded with previously persisted entries.
    pub fn with_entries(walker: VaultWalker, entries: impl IntoIterator<Item = FileState>) -> Self {
        let cache = entries.into_iter().map(|e| (e.path.clone(), e)).collect();
        Self { walker, cache }
    }

    pub fn root(&self) -> &Path {
        self.walker.root()
    }

    /// All markdown files currently in the vault, in scan order.
    pub fn scan(&self) -> Result<VaultScan, TrackerError> {
        Ok(self.walker.walk()?)
    }

    /// Scan the vault and classify every path against the cache.
    ///
    /// Only a failure to enumerate the vault root is returned as an error;
    /// per-path walk and read failures are collected in
    /// [`DiffOutcome::failures`].
    pub async fn diff(&mut self) -> Result<DiffOutcome, TrackerError> {
        let current = self.scan()?;
        Ok(self.diff_files(current).await)
    }

    pub(crate) async fn diff_files(&mut self, scan: VaultScan) -> DiffOutcome {
        let VaultScan { files: current, failures: walk_failures } = scan;
        let mut outcome = DiffOutcome::default();

        // Cached files under an entry that failed to list are kept, not deleted
        let seen: BTreeSet<&str> = current.iter().map(|f| f.path.as_str()).collect();
        let gone: Vec<String> = self
            .cache
            .keys()
            .filter(|p| !seen.contains(p.as_str()))
            .filter(|p| !walk_failures.iter().any(|f| covers(&f.path, p)))
            .cloned()
            .collect();
        for path in gone {
            self.cache.remove(&path);
            tracing::debug!("deleted: {path}");
            outcome.report.deleted.push(path);
        }

        outcome.failures.extend(
            walk_failures
                .into_iter()
                .map(|f| ReadFailure { path: f.path, message: f.message }),
        );

        for file in current {
            let content = match tokio::fs::read_to_string(&file.absolute_path).await {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    // Vanished between scan and read
                    if self.cache.remove(&file.path).is_some() {
                        tracing::debug!("deleted during scan: {}", file.path);
                        outcome.report.deleted.push(file.path);
                    }
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", file.path, e);
                    outcome
                        .failures
                        .push(ReadFailure { path: file.path, message: e.to_string() });
                    continue;
                }
            };

            let modified: DateTime<Utc> = file.modified.into();

            match self.cache.get_mut(&file.path) {
                None => {
                    tracing::debug!("added: {}", file.path);
                    outcome.report.added.push(file.path.clone());
                    outcome.changed.push(file.path.clone());
                    self.cache.insert(
                        file.path.clone(),
                        FileState { path: file.path, content, modified },
                    );
                }
                Some(cached) if cached.content != content => {
                    tracing::debug!("modified (content): {}", file.path);
                    cached.content = content;
                    cached.modified = modified;
                    outcome.report.modified.push(file.path.clone());
                    outcome.changed.push(file.path);
                }
                Some(cached) if modified > cached.modified => {
                    // Same text, newer timestamp: still re-index
                    tracing::debug!("modified (mtime): {}", file.path);
                    cached.modified = modified;
                    outcome.report.modified.push(file.path.clone());
                    outcome.changed.push(file.path);
                }
                Some(_) => {}
            }
        }

        outcome.report.deleted.sort();
        outcome
    }

    /// Cached state for a path, if it has been read before.
    pub fn get(&self, path: &str) -> Option<&FileState> {
        self.cache.get(path)
    }

    /// All cached entries, sorted by path.
    pub fn entries(&self) -> impl Iterator<Item = &FileState> {
        self.cache.values()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn covers(failed: &str, path: &str) -> bool {
    failed.is_empty()
        || path == failed
        || path.strip_prefix(failed).is_some_and(|rest| rest.starts_with('/'))
}
