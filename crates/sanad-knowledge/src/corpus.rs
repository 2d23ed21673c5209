//! In-process corpus source.

use async_trait::async_trait;
use sanad_core::error::Result;
use sanad_core::traits::CorpusSource;
use tokio::sync::RwLock;

/// Corpus text held in memory. Useful for tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct InMemoryCorpus {
    text: RwLock<String>,
}

impl InMemoryCorpus {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: RwLock::new(text.into()),
        }
    }
}

#[async_trait]
impl CorpusSource for InMemoryCorpus {
    async fn corpus_text(&self) -> Result<String> {
        Ok(self.text.read().await.clone())
    }

    async fn set_corpus_text(&self, text: &str) -> Result<()> {
        *self.text.write().await = text.to_string();
        Ok(())
    }
}
