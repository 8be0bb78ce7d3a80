//! Database connection and snapshot persistence.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;

use super::schema::{SchemaError, init_schema};
use crate::graph::DocumentNode;
use crate::tracker::FileState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to create state directory {0}: {1}")]
    CreateDir(String, #[source] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Tracker cache and graph nodes as persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub files: Vec<FileState>,
    pub nodes: Vec<DocumentNode>,
}

/// Sync state database handle.
pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    /// Open or create a state database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| StoreError::CreateDir(dir.display().to_string(), e))?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Load the full snapshot. Node links come back unresolved.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot { files: self.load_file_states()?, nodes: self.load_nodes()? })
    }

    /// Replace the stored state with `snapshot` in one transaction.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM file_states", [])?;
        tx.execute("DELETE FROM nodes", [])?;

        {
            let mut insert_file = tx.prepare(
                "INSERT INTO file_states (path, content, modified_at) VALUES (?1, ?2, ?3)",
            )?;
            for file in &snapshot.files {
                insert_file.execute(params![
                    file.path,
                    file.content,
                    file.modified.to_rfc3339_opts(SecondsFormat::Nanos, true),
                ])?;
            }

            let mut insert_node = tx.prepare(
                "INSERT INTO nodes (path, title, raw_links, index_id) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for node in &snapshot.nodes {
                let raw_links: Vec<&str> = node.raw_links().collect();
                let raw_links = serde_json::to_string(&raw_links)
                    .map_err(|e| StoreError::InvalidData(e.to_string()))?;
                insert_node.execute(params![node.path, node.title, raw_links, node.index_id])?;
            }
        }

        tx.commit()?;
        tracing::debug!(
            "saved state: {} files, {} nodes",
            snapshot.files.len(),
            snapshot.nodes.len()
        );
        Ok(())
    }

    fn load_file_states(&self) -> Result<Vec<FileState>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, content, modified_at FROM file_states ORDER BY path")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut files = Vec::new();
        for row in rows {
            let (path, content, modified_str) = row?;
            let modified = DateTime::parse_from_rfc3339(&modified_str)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| {
                    StoreError::InvalidData(format!("bad timestamp for {path}: {e}"))
                })?;
            files.push(FileState { path, content, modified });
        }
        Ok(files)
    }

    fn load_nodes(&self) -> Result<Vec<DocumentNode>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, title, raw_links, index_id FROM nodes ORDER BY path")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut nodes = Vec::new();
        for row in rows {
            let (path, title, raw_links, index_id) = row?;
            let raw_links: BTreeSet<String> = serde_json::from_str(&raw_links)
                .map_err(|e| StoreError::InvalidData(format!("bad links for {path}: {e}")))?;
            let mut node = DocumentNode::new(path, title, raw_links);
            node.index_id = index_id;
            nodes.push(node);
        }
        Ok(nodes)
    }

    #[cfg(test)]
    fn count_files(&self) -> Result<i64, StoreError> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM file_states", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_snapshot() -> Snapshot {
        let mut linked = DocumentNode::new("a.md", "A", ["b".to_string(), "gone".to_string()]);
        linked.index_id = Some("t:a.md".to_string());

        Snapshot {
            files: vec![
                FileState {
                    path: "a.md".to_string(),
                    content: "# A\n[[b]] [[gone]]".to_string(),
                    modified: Utc::now(),
                },
                FileState {
                    path: "b.md".to_string(),
                    content: "# B".to_string(),
                    modified: Utc::now(),
                },
            ],
            nodes: vec![linked, DocumentNode::new("b.md", "B", Vec::new())],
        }
    }

    #[test]
    fn test_save_and_load() {
        let store = StateStore::open_in_memory().unwrap();
        let snapshot = sample_snapshot();
        store.save(&snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(store.count_files().unwrap(), 2);
    }

    #[test]
    fn test_save_replaces_previous_state() {
        let store = StateStore::open_in_memory().unwrap();
        store.save(&sample_snapshot()).unwrap();

        let mut smaller = sample_snapshot();
        smaller.files.truncate(1);
        smaller.nodes.truncate(1);
        store.save(&smaller).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.files.len(), 1);
        assert_eq!(loaded.nodes.len(), 1);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/nested/state.db");
        let store = StateStore::open(&path).unwrap();
        store.save(&sample_snapshot()).unwrap();
        drop(store);

        let reopened = StateStore::open(&path).unwrap();
        assert_eq!(reopened.load().unwrap().nodes.len(), 2);
    }
}
