//! One reconciliation pass between the vault and the document index.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::graph::GraphBuilder;
use crate::index::{DocumentIndex, Metadata};
use crate::knowledge::KnowledgeGraphService;
use crate::store::Snapshot;
use crate::tracker::{FileStateTracker, SyncReport, TrackerError};
use crate::vault::VaultWalker;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Where in the pass a document failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStage {
    Read,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub path: String,
    pub stage: SyncStage,
    pub message: String,
}

/// Result of [`SyncEngine::sync`].
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub report: SyncReport,
    pub failures: Vec<SyncFailure>,
    /// Documents in the graph after the pass.
    pub total_documents: usize,
}

/// Wire shape of a completed sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub status: String,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub total_documents: usize,
    pub failed: Vec<String>,
}

impl From<&SyncOutcome> for SyncResponse {
    fn from(outcome: &SyncOutcome) -> Self {
        Self {
            status: "completed".to_string(),
            added: outcome.report.added.clone(),
            modified: outcome.report.modified.clone(),
            deleted: outcome.report.deleted.clone(),
            total_documents: outcome.total_documents,
            failed: outcome.failures.iter().map(|f| f.path.clone()).collect(),
        }
    }
}

/// Owns the tracker and graph for one vault and pushes changes to the index.
pub struct SyncEngine<I: DocumentIndex + ?Sized> {
    tracker: FileStateTracker,
    graph: GraphBuilder,
    service: KnowledgeGraphService<I>,
}

impl<I: DocumentIndex + ?Sized> SyncEngine<I> {
    /// Engine with empty state; the first pass reports every file as added.
    pub fn new(walker: VaultWalker, service: KnowledgeGraphService<I>) -> Self {
        Self { tracker: FileStateTracker::new(walker), graph: GraphBuilder::new(), service }
    }

    /// Engine seeded from persisted state.
    ///
    /// Nodes without a tracked file are dropped so graph and cache stay
    /// keyed by the same paths.
    pub fn restore(
        walker: VaultWalker,
        snapshot: Snapshot,
        service: KnowledgeGraphService<I>,
    ) -> Self {
        let tracker = FileStateTracker::with_entries(walker, snapshot.files);
        let nodes = snapshot.nodes.into_iter().filter(|n| tracker.get(&n.path).is_some());
        let graph = GraphBuilder::from_nodes(nodes);
        Self { tracker, graph, service }
    }

    /// Current state, ready to persist.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            files: self.tracker.entries().cloned().collect(),
            nodes: self.graph.nodes().cloned().collect(),
        }
    }

    pub fn tracker(&self) -> &FileStateTracker {
        &self.tracker
    }

    pub fn graph(&self) -> &GraphBuilder {
        &self.graph
    }

    pub fn service(&self) -> &KnowledgeGraphService<I> {
        &self.service
    }

    /// Run one pass: diff the vault, update the graph, store changed documents.
    ///
    /// Per-document failures are collected, never fatal. Deleted documents
    /// leave the graph but their index records are kept.
    pub async fn sync(&mut self) -> Result<SyncOutcome, SyncError> {
        let diff = self.tracker.diff().await?;

        let mut failures: Vec<SyncFailure> = diff
            .failures
            .into_iter()
            .map(|f| SyncFailure { path: f.path, stage: SyncStage::Read, message: f.message })
            .collect();

        for path in &diff.report.deleted {
            if self.graph.remove_node(path).is_some() {
                tracing::debug!("removed node: {path}");
            }
        }

        let mut upserted = Vec::with_capacity(diff.changed.len());
        for path in diff.changed {
            let Some(state) = self.tracker.get(&path) else {
                continue;
            };
            self.graph.upsert_node(&path, &state.content);
            upserted.push(path);
        }
        self.graph.resolve();

        failures.extend(self.store_all(&upserted).await);

        let outcome = SyncOutcome {
            report: diff.report,
            failures,
            total_documents: self.graph.len(),
        };

        tracing::info!(
            added = outcome.report.added.len(),
            modified = outcome.report.modified.len(),
            deleted = outcome.report.deleted.len(),
            failed = outcome.failures.len(),
            total = outcome.total_documents,
            "sync completed"
        );
        Ok(outcome)
    }

    /// Store every document currently in the graph, changed or not.
    ///
    /// Used to populate an index that does not outlive the process.
    pub async fn reindex_all(&mut self) -> Vec<SyncFailure> {
        let paths: Vec<String> = self.graph.nodes().map(|n| n.path.clone()).collect();
        let failures = self.store_all(&paths).await;
        tracing::info!(
            namespace = self.service.namespace(),
            documents = paths.len(),
            failed = failures.len(),
            "reindex completed"
        );
        failures
    }

    async fn store_all(&mut self, paths: &[String]) -> Vec<SyncFailure> {
        let mut failures = Vec::new();

        for path in paths {
            let (Some(node), Some(state)) = (self.graph.node(path), self.tracker.get(path)) else {
                continue;
            };

            let links: Vec<String> = node.raw_links().map(String::from).collect();
            let mut metadata = Metadata::new();
            metadata.insert("title".to_string(), json!(node.title));
            metadata.insert("resolvedLinks".to_string(), json!(node.resolved_links()));

            match self.service.store_document(path, &state.content, &links, metadata).await {
                Ok(id) => {
                    self.graph.set_index_id(path, id);
                }
                Err(e) => {
                    tracing::warn!("Failed to store {path}: {e}");
                    failures.push(SyncFailure {
                        path: path.clone(),
                        stage: SyncStage::Store,
                        message: e.to_string(),
                    });
                }
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexError, MemoryIndex, SearchHit};
    use crate::store::StateStore;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Memory index that refuses to store documents containing a marker.
    struct FlakyIndex {
        inner: MemoryIndex,
    }

    #[async_trait]
    impl DocumentIndex for FlakyIndex {
        async fn generate_embeddings(
            &self,
            texts: &[String],
            model: Option<&str>,
        ) -> Result<Vec<Vec<f32>>, IndexError> {
            self.inner.generate_embeddings(texts, model).await
        }

        async fn upsert_vector(
            &self,
            vector: Vec<f32>,
            document: &str,
            metadata: Metadata,
            namespace: &str,
            id: Option<&str>,
        ) -> Result<String, IndexError> {
            if document.contains("FAIL") {
                return Err(IndexError::Unavailable("refused".to_string()));
            }
            self.inner.upsert_vector(vector, document, metadata, namespace, id).await
        }

        async fn semantic_search(
            &self,
            query_text: &str,
            namespace: &str,
            limit: usize,
            threshold: f32,
            filter: Option<&Metadata>,
        ) -> Result<Vec<SearchHit>, IndexError> {
            self.inner.semantic_search(query_text, namespace, limit, threshold, filter).await
        }
    }

    fn create_vault() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# Alpha\n\nSee [[b]] and [[nowhere]].").unwrap();
        fs::write(dir.path().join("b.md"), "# Beta\n\nBack to [alpha](./a.md).").unwrap();
        dir
    }

    fn engine(dir: &TempDir, index: &Arc<MemoryIndex>) -> SyncEngine<MemoryIndex> {
        let walker = VaultWalker::new(dir.path()).unwrap();
        SyncEngine::new(walker, KnowledgeGraphService::new(Arc::clone(index), "ns", "t"))
    }

    #[tokio::test]
    async fn test_first_sync_stores_everything() {
        let vault = create_vault();
        let index = Arc::new(MemoryIndex::default());
        let mut engine = engine(&vault, &index);

        let outcome = engine.sync().await.unwrap();
        assert_eq!(outcome.report.added, vec!["a.md", "b.md"]);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.total_documents, 2);
        assert_eq!(index.len("ns").await, 2);

        let a = engine.graph().node("a.md").unwrap();
        assert_eq!(a.index_id.as_deref(), Some("t:a.md"));

        let meta = index.metadata("ns", "t:a.md").await.unwrap();
        assert_eq!(meta["title"], json!("Alpha"));
        assert_eq!(meta["links"], json!(["b", "nowhere"]));
        assert_eq!(meta["resolvedLinks"], json!(["b.md"]));
    }

    #[tokio::test]
    async fn test_unchanged_sync_is_empty() {
        let vault = create_vault();
        let index = Arc::new(MemoryIndex::default());
        let mut engine = engine(&vault, &index);
        engine.sync().await.unwrap();

        let outcome = engine.sync().await.unwrap();
        assert!(outcome.report.is_empty());
        assert_eq!(outcome.total_documents, 2);
    }

    #[tokio::test]
    async fn test_edit_and_delete() {
        let vault = create_vault();
        let index = Arc::new(MemoryIndex::default());
        let mut engine = engine(&vault, &index);
        engine.sync().await.unwrap();

        fs::write(vault.path().join("a.md"), "# Alpha v2\n\nNo more links.").unwrap();
        let outcome = engine.sync().await.unwrap();
        assert_eq!(outcome.report.modified, vec!["a.md"]);
        assert_eq!(engine.graph().node("a.md").unwrap().title, "Alpha v2");

        fs::remove_file(vault.path().join("b.md")).unwrap();
        let outcome = engine.sync().await.unwrap();
        assert_eq!(outcome.report.deleted, vec!["b.md"]);
        assert!(!engine.graph().contains("b.md"));
        assert_eq!(outcome.total_documents, 1);
        // Index records of deleted documents are kept
        assert_eq!(index.len("ns").await, 2);
    }

    #[tokio::test]
    async fn test_new_file_resolves_dangling_link() {
        let vault = create_vault();
        let index = Arc::new(MemoryIndex::default());
        let mut engine = engine(&vault, &index);
        engine.sync().await.unwrap();
        assert_eq!(engine.graph().dangling().len(), 1);

        fs::write(vault.path().join("nowhere.md"), "# Somewhere").unwrap();
        engine.sync().await.unwrap();
        assert!(engine.graph().dangling().is_empty());
        assert_eq!(engine.graph().backlinks("nowhere.md"), vec!["a.md"]);
    }

    #[tokio::test]
    async fn test_store_failure_is_isolated() {
        let vault = create_vault();
        fs::write(vault.path().join("c.md"), "# Gamma\n\nFAIL").unwrap();

        let index = Arc::new(FlakyIndex { inner: MemoryIndex::default() });
        let walker = VaultWalker::new(vault.path()).unwrap();
        let service = KnowledgeGraphService::new(Arc::clone(&index), "ns", "t");
        let mut engine = SyncEngine::new(walker, service);

        let outcome = engine.sync().await.unwrap();
        assert_eq!(outcome.report.added, vec!["a.md", "b.md", "c.md"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].path, "c.md");
        assert_eq!(outcome.failures[0].stage, SyncStage::Store);
        assert_eq!(index.inner.len("ns").await, 2);

        let c = engine.graph().node("c.md").unwrap();
        assert!(c.index_id.is_none());

        // No retry on the next pass
        let outcome = engine.sync().await.unwrap();
        assert!(outcome.report.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_engine_behind_dyn_index() {
        let vault = create_vault();
        let index: Arc<dyn DocumentIndex> = Arc::new(MemoryIndex::default());
        let walker = VaultWalker::new(vault.path()).unwrap();
        let mut engine = SyncEngine::new(walker, KnowledgeGraphService::new(index, "ns", "t"));

        let outcome = engine.sync().await.unwrap();
        assert_eq!(outcome.total_documents, 2);
    }

    #[tokio::test]
    async fn test_restore_from_snapshot_and_reindex() {
        let vault = create_vault();
        let store = StateStore::open_in_memory().unwrap();
        {
            let index = Arc::new(MemoryIndex::default());
            let mut engine = engine(&vault, &index);
            engine.sync().await.unwrap();
            store.save(&engine.snapshot()).unwrap();
        }

        let index = Arc::new(MemoryIndex::default());
        let walker = VaultWalker::new(vault.path()).unwrap();
        let service = KnowledgeGraphService::new(Arc::clone(&index), "ns", "t");
        let mut engine = SyncEngine::restore(walker, store.load().unwrap(), service);

        assert_eq!(engine.graph().len(), 2);
        assert_eq!(engine.graph().dangling().len(), 1);
        let outcome = engine.sync().await.unwrap();
        assert!(outcome.report.is_empty());

        assert_eq!(index.len("ns").await, 0);
        assert!(engine.reindex_all().await.is_empty());
        assert_eq!(index.len("ns").await, 2);
    }

    #[test]
    fn test_sync_response_shape() {
        let outcome = SyncOutcome {
            report: SyncReport {
                added: vec!["a.md".to_string()],
                modified: Vec::new(),
                deleted: vec!["z.md".to_string()],
            },
            failures: vec![SyncFailure {
                path: "c.md".to_string(),
                stage: SyncStage::Store,
                message: "down".to_string(),
            }],
            total_documents: 3,
        };

        let value = serde_json::to_value(SyncResponse::from(&outcome)).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "completed",
                "added": ["a.md"],
                "modified": [],
                "deleted": ["z.md"],
                "totalDocuments": 3,
                "failed": ["c.md"],
            })
        );
    }
}
