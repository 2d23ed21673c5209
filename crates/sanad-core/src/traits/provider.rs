//! Remote model traits: embedding and text generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SanadError};
use crate::types::EmbeddingVector;

/// Sampling options for a single completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// Converts text into fixed-dimension vectors.
///
/// Output is positionally aligned with the input. Implementations must fail
/// rather than substitute zero vectors, and must not retry internally.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>>;

    async fn embed_one(&self, text: &str) -> Result<EmbeddingVector> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SanadError::Upstream(format!("{}: no embedding returned", self.name())))
    }
}

/// A generative model answering a system + user prompt pair.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, system: &str, user: &str, params: &GenerateParams) -> Result<String>;
}
