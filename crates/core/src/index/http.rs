//! JSON-over-HTTP client for a remote document index.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::{DocumentIndex, IndexError, Metadata, SearchHit};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    texts: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vector: Vec<f32>,
    document: &'a str,
    metadata: Metadata,
    namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

#[derive(Deserialize)]
struct UpsertResponse {
    id: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    namespace: &'a str,
    limit: usize,
    threshold: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a Metadata>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Client for an index service exposing `/embeddings`, `/vectors` and `/search`.
#[derive(Debug, Clone)]
pub struct HttpDocumentIndex {
    client: Client,
    base_url: String,
}

impl HttpDocumentIndex {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, IndexError> {
        let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, IndexError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let started = Instant::now();
        let url = self.endpoint(path);

        let resp = self.client.post(&url).json(body).send().await.inspect_err(|error| {
            tracing::debug!(
                event = "index.http.request_failed",
                url,
                elapsed_ms = started.elapsed().as_millis(),
                error = %error,
                "index request failed"
            );
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(
                event = "index.http.non_success_status",
                url,
                status = %status,
                elapsed_ms = started.elapsed().as_millis(),
                "index returned non-success status"
            );
            return Err(IndexError::Status { status: status.as_u16(), body });
        }

        let data = resp.json::<R>().await.map_err(|e| IndexError::Decode(e.to_string()))?;
        tracing::debug!(
            event = "index.http.completed",
            url,
            elapsed_ms = started.elapsed().as_millis(),
            "index request completed"
        );
        Ok(data)
    }
}

#[async_trait]
impl DocumentIndex for HttpDocumentIndex {
    async fn generate_embeddings(
        &self,
        texts: &[String],
        model: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, IndexError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = model.map(str::trim).filter(|m| !m.is_empty());
        let resp: EmbeddingsResponse =
            self.post("embeddings", &EmbeddingsRequest { texts, model }).await?;

        if resp.embeddings.len() != texts.len() || resp.embeddings.iter().any(Vec::is_empty) {
            return Err(IndexError::EmptyEmbedding);
        }
        Ok(resp.embeddings)
    }

    async fn upsert_vector(
        &self,
        vector: Vec<f32>,
        document: &str,
        metadata: Metadata,
        namespace: &str,
        id: Option<&str>,
    ) -> Result<String, IndexError> {
        let request = UpsertRequest { vector, document, metadata, namespace, id };
        let resp: UpsertResponse = self.post("vectors", &request).await?;
        Ok(resp.id)
    }

    async fn semantic_search(
        &self,
        query_text: &str,
        namespace: &str,
        limit: usize,
        threshold: f32,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let request = SearchRequest { query: query_text, namespace, limit, threshold, filter };
        let resp: SearchResponse = self.post("search", &request).await?;
        Ok(resp.results)
    }
}
