//! File-state tracking data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cached state of one vault file from a previous scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// Vault-relative path.
    pub path: String,
    /// Full text content at last read.
    pub content: String,
    /// Modification time at last read.
    pub modified: DateTime<Utc>,
}

/// Vault-side delta produced by one diff pass.
///
/// Paths are vault-relative. `added` and `modified` follow scan order,
/// `deleted` is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl SyncReport {
    /// True when the pass observed no change at all.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Number of paths across all three lists.
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}

/// A file that could not be read during a diff pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFailure {
    pub path: String,
    pub message: String,
}

/// Everything a diff pass produced.
#[derive(Debug, Clone, Default)]
pub struct DiffOutcome {
    pub report: SyncReport,
    /// Added and modified paths, in scan order.
    pub changed: Vec<String>,
    /// Per-file read failures; these paths are absent from the report.
    pub failures: Vec<ReadFailure>,
}
