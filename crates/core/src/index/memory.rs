//! In-process document index.
//!
//! Embeddings are hashed bag-of-words vectors, so similar wording gives
//! similar vectors without any model. Used as the offline backend and as a
//! test double.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DocumentIndex, IndexError, Metadata, SearchHit};

/// Default embedding dimension.
pub const DEFAULT_DIMENSION: usize = 256;

#[derive(Debug, Clone)]
struct StoredVector {
    vector: Vec<f32>,
    document: String,
    metadata: Metadata,
}

/// Vector records held in memory, partitioned by namespace.
#[derive(Debug)]
pub struct MemoryIndex {
    dimension: usize,
    namespaces: RwLock<HashMap<String, BTreeMap<String, StoredVector>>>,
    next_id: AtomicU64,
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl MemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            namespaces: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Hashed term-frequency vector, normalized to unit length.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];

        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        normalize(&mut vector);
        vector
    }

    /// Number of records stored in `namespace`.
    pub async fn len(&self, namespace: &str) -> usize {
        self.namespaces.read().await.get(namespace).map_or(0, BTreeMap::len)
    }

    /// Stored metadata for one record.
    pub async fn metadata(&self, namespace: &str, id: &str) -> Option<Metadata> {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .and_then(|records| records.get(id))
            .map(|r| r.metadata.clone())
    }
}

#[async_trait]
impl DocumentIndex for MemoryIndex {
    async fn generate_embeddings(
        &self,
        texts: &[String],
        _model: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, IndexError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn upsert_vector(
        &self,
        vector: Vec<f32>,
        document: &str,
        metadata: Metadata,
        namespace: &str,
        id: Option<&str>,
    ) -> Result<String, IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::Dimension { expected: self.dimension, found: vector.len() });
        }

        let id = match id {
            Some(id) => id.to_string(),
            None => format!("vec-{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
        };

        let record = StoredVector { vector, document: document.to_string(), metadata };
        self.namespaces
            .write()
            .await
            .entry(namespace.to_string())
            .or_default()
            .insert(id.clone(), record);

        Ok(id)
    }

    async fn semantic_search(
        &self,
        query_text: &str,
        namespace: &str,
        limit: usize,
        threshold: f32,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let query = self.embed(query_text);
        let namespaces = self.namespaces.read().await;
        let Some(records) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<SearchHit> = records
            .iter()
            .filter(|(_, r)| filter.is_none_or(|f| matches_filter(&r.metadata, f)))
            .map(|(id, r)| SearchHit {
                id: id.clone(),
                score: cosine_similarity(&query, &r.vector),
                document: r.document.clone(),
                metadata: r.metadata.clone(),
            })
            .filter(|hit| hit.score >= threshold)
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn matches_filter(metadata: &Metadata, filter: &Metadata) -> bool {
    filter.iter().all(|(key, value)| metadata.get(key) == Some(value))
}
