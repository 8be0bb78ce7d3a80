//! Client side of the external document index.
//!
//! The index embeds text and ranks stored vectors by similarity; vaultgraph
//! only talks to it through [`DocumentIndex`]. Two backends ship here:
//! [`HttpDocumentIndex`] for a remote service and [`MemoryIndex`], an
//! in-process stand-in.

pub mod http;
pub mod memory;

pub use http::HttpDocumentIndex;
pub use memory::MemoryIndex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Free-form metadata attached to a stored vector.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("index service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode index response: {0}")]
    Decode(String),

    #[error("index service returned no embedding")]
    EmptyEmbedding,

    #[error("vector has dimension {found}, index expects {expected}")]
    Dimension { expected: usize, found: usize },

    #[error("index service unavailable: {0}")]
    Unavailable(String),
}

/// One ranked result from a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub document: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Namespace-scoped embedding store and similarity search.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Embed each text; the result has one vector per input, in order.
    async fn generate_embeddings(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, IndexError>;

    /// Insert or replace a vector record. Returns the record id.
    async fn upsert_vector(
        &self,
        vector: Vec<f32>,
        document: &str,
        metadata: Metadata,
        namespace: &str,
        id: Option<&str>,
    ) -> Result<String, IndexError>;

    /// Records in `namespace` scoring at least `threshold` against
    /// `query_text`, best first, at most `limit`. When `filter` is given,
    /// every key must equal the record's metadata value.
    async fn semantic_search(
        &self,
        query_text: &str,
        namespace: &str,
        limit: usize,
        threshold: f32,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchHit>, IndexError>;
}
