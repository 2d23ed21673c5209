//! Embeddings against any OpenAI-compatible `/embeddings` endpoint.

use async_trait::async_trait;
use sanad_core::error::{Result, SanadError};
use sanad_core::traits::provider::Embedder;
use sanad_core::types::EmbeddingVector;
use serde::Deserialize;

use crate::endpoint::Endpoint;

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding model behind a single fixed model identifier.
pub struct OpenAiEmbedder {
    endpoint: Endpoint,
    model: String,
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(endpoint: Endpoint, model: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint,
            model: model.into(),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Decode an embeddings response, restoring input order and checking that
/// exactly one vector came back per input.
pub fn parse_embedding_response(provider: &str, body: &str, expected: usize) -> Result<Vec<EmbeddingVector>> {
    let parsed: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| SanadError::Upstream(format!("{provider}: failed to parse embeddings: {e}")))?;

    let mut items = parsed.data;
    if items.len() != expected {
        return Err(SanadError::Upstream(format!(
            "{provider}: expected {expected} embeddings, got {}",
            items.len()
        )));
    }
    items.sort_by_key(|item| item.index);

    if items.iter().any(|item| item.embedding.is_empty()) {
        return Err(SanadError::Upstream(format!("{provider}: empty embedding vector")));
    }
    Ok(items.into_iter().map(|item| item.embedding).collect())
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        &self.endpoint.name
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint.embeddings_url()?;
        let start = std::time::Instant::now();
        let resp = self
            .endpoint
            .post(&self.client, &url)?
            .json(&serde_json::json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await
            .map_err(|e| SanadError::Upstream(format!("{} embeddings request failed: {e}", self.endpoint.name)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(SanadError::Upstream(format!(
                "{} embeddings API error {}: {}",
                self.endpoint.name, status, text
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SanadError::Upstream(format!("{}: failed to read embeddings: {e}", self.endpoint.name)))?;
        let vectors = parse_embedding_response(&self.endpoint.name, &body, texts.len())?;

        tracing::debug!(
            "Embedded {} text(s) with {} in {}ms",
            texts.len(),
            self.model,
            start.elapsed().as_millis()
        );
        Ok(vectors)
    }
}
