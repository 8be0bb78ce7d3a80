//! Query-facing side of the knowledge graph.
//!
//! [`KnowledgeGraphService`] stores documents in the external index and turns
//! similarity hits back into vault paths, titles and links.

mod types;

pub use types::{RelatedDocument, RelatedResponse, SuggestionResponse};

use std::path::Path;
use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;

use crate::index::{DocumentIndex, IndexError, Metadata, SearchHit};

pub const DEFAULT_RELATED_LIMIT: usize = 10;
pub const DEFAULT_RELATED_THRESHOLD: f32 = 0.7;
pub const DEFAULT_SUGGEST_LIMIT: usize = 5;
pub const DEFAULT_SUGGEST_THRESHOLD: f32 = 0.75;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Index record id for a document; stable across re-stores.
pub fn document_id(tenant: &str, path: &str) -> String {
    format!("{tenant}:{path}")
}

/// Document storage and retrieval scoped to one namespace and tenant.
pub struct KnowledgeGraphService<I: DocumentIndex + ?Sized> {
    index: Arc<I>,
    namespace: String,
    tenant: String,
    model: Option<String>,
}

impl<I: DocumentIndex + ?Sized> KnowledgeGraphService<I> {
    pub fn new(index: Arc<I>, namespace: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self { index, namespace: namespace.into(), tenant: tenant.into(), model: None }
    }

    /// Use a specific embedding model instead of the service default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    /// Embed and upsert one document. Returns the index record id.
    ///
    /// `path`, `links` and `tenant` are written over any keys of the same
    /// name in `metadata`.
    pub async fn store_document(
        &self,
        path: &str,
        content: &str,
        links: &[String],
        metadata: Metadata,
    ) -> Result<String, KnowledgeError> {
        let embeddings =
            self.index.generate_embeddings(&[content.to_string()], self.model.as_deref()).await?;
        let vector = embeddings.into_iter().next().ok_or(IndexError::EmptyEmbedding)?;

        let mut metadata = metadata;
        metadata.insert("path".to_string(), json!(path));
        metadata.insert("links".to_string(), json!(links));
        metadata.insert("tenant".to_string(), json!(self.tenant));

        let id = document_id(&self.tenant, path);
        let stored = self
            .index
            .upsert_vector(vector, content, metadata, &self.namespace, Some(&id))
            .await?;

        tracing::debug!("stored {path} as {stored}");
        Ok(stored)
    }

    /// Documents similar to `query`, best first.
    pub async fn find_related(
        &self,
        query: &str,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<RelatedDocument>, KnowledgeError> {
        let mut filter = Metadata::new();
        filter.insert("tenant".to_string(), json!(self.tenant));

        let hits = self
            .index
            .semantic_search(query, &self.namespace, limit, threshold, Some(&filter))
            .await?;

        let mut related: Vec<RelatedDocument> = hits
            .into_iter()
            .filter(|hit| hit.score >= threshold)
            .filter_map(related_from_hit)
            .collect();

        related.sort_by(|a, b| b.score.total_cmp(&a.score));
        related.truncate(limit);
        Ok(related)
    }

    /// Documents worth linking from `content`, excluding `current_path`.
    pub async fn suggest_references(
        &self,
        content: &str,
        current_path: Option<&str>,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<RelatedDocument>, KnowledgeError> {
        let mut related = self.find_related(content, limit.saturating_add(1), threshold).await?;
        if let Some(current) = current_path {
            related.retain(|doc| doc.path != current);
        }
        related.truncate(limit);
        Ok(related)
    }
}

fn related_from_hit(hit: SearchHit) -> Option<RelatedDocument> {
    let path = hit.metadata.get("path").and_then(Value::as_str)?.to_string();

    let title = match hit.metadata.get("title").and_then(Value::as_str) {
        Some(title) => title.to_string(),
        None => Path::new(&path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone()),
    };

    let links = hit
        .metadata
        .get("links")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default();

    Some(RelatedDocument { path, title, score: hit.score, links })
}
