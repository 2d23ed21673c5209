//! # Sanad Providers
//!
//! Remote model implementations for Sanad.
//!
//! Every supported backend speaks the OpenAI wire format, so chat goes
//! through `OpenAiCompatibleProvider` and embeddings through
//! `OpenAiEmbedder`; providers differ only by endpoint URL, auth style and
//! API key.

pub mod embeddings;
pub mod endpoint;
pub mod openai_compatible;
pub mod provider_registry;

use sanad_core::config::{EmbeddingConfig, LlmConfig};
use sanad_core::error::Result;
use sanad_core::traits::{Embedder, Generator};
use std::sync::Arc;

pub use embeddings::OpenAiEmbedder;
pub use endpoint::Endpoint;
pub use openai_compatible::OpenAiCompatibleProvider;

/// Create the generative model from `[llm]` configuration.
pub fn create_generator(config: &LlmConfig) -> Result<Arc<dyn Generator>> {
    let endpoint = Endpoint::resolve(&config.provider, &config.endpoint, &config.api_key)?;
    let client = endpoint::http_client(config.timeout_secs)?;
    tracing::info!("LLM provider: {} ({})", endpoint.name, config.model);
    Ok(Arc::new(OpenAiCompatibleProvider::new(endpoint, client)))
}

/// Create the embedding model from `[embedding]` configuration.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let endpoint = Endpoint::resolve(&config.provider, &config.endpoint, &config.api_key)?;
    // Fail fast on providers that cannot embed at all; credentials are
    // still checked per call.
    endpoint.embeddings_url()?;
    let client = endpoint::http_client(config.timeout_secs)?;
    tracing::info!("Embedding provider: {} ({})", endpoint.name, config.model);
    Ok(Arc::new(OpenAiEmbedder::new(endpoint, config.model.clone(), client)))
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::all_provider_names();
    names.push("custom");
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_from_defaults() {
        assert!(create_generator(&LlmConfig::default()).is_ok());
        assert!(create_embedder(&EmbeddingConfig::default()).is_ok());
    }

    #[test]
    fn test_embedder_rejects_chat_only_provider() {
        let config = EmbeddingConfig {
            provider: "groq".into(),
            ..EmbeddingConfig::default()
        };
        assert!(create_embedder(&config).is_err());
    }

    #[test]
    fn test_available_providers() {
        let names = available_providers();
        assert!(names.contains(&"openai"));
        assert!(names.contains(&"custom"));
    }
}
