//! Graph data types for vault documents and links.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Outcome of resolving one raw link target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "state", content = "path", rename_all = "lowercase")]
pub enum LinkResolution {
    /// Target matched the node at this vault path.
    Resolved(String),
    /// No node matched (dangling link).
    Unresolved,
}

impl LinkResolution {
    pub fn resolved_path(&self) -> Option<&str> {
        match self {
            Self::Resolved(path) => Some(path),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// One note in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Vault-relative path; the unique key.
    pub path: String,
    /// First heading, or the filename stem.
    pub title: String,
    /// Raw link targets mapped to their resolution.
    pub links: BTreeMap<String, LinkResolution>,
    /// Identifier returned by the document index after the last successful store.
    pub index_id: Option<String>,
}

impl DocumentNode {
    /// Create a node whose links are not yet resolved.
    pub fn new(
        path: impl Into<String>,
        title: impl Into<String>,
        raw_links: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            links: raw_links.into_iter().map(|l| (l, LinkResolution::Unresolved)).collect(),
            index_id: None,
        }
    }

    /// Link targets as written (after normalization).
    pub fn raw_links(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    /// Paths of nodes this document links to.
    pub fn resolved_links(&self) -> BTreeSet<&str> {
        self.links.values().filter_map(LinkResolution::resolved_path).collect()
    }
}

/// A directed reference from one document to a raw target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEdge {
    pub source: String,
    pub raw_target: String,
    pub resolution: LinkResolution,
}

/// Summary counts for a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub resolved: usize,
    pub dangling: usize,
    pub orphans: usize,
}
