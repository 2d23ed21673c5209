use async_trait::async_trait;

use crate::error::Result;

/// Where the operator-supplied knowledge text lives.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Current corpus text. A missing corpus is an empty string, not an error.
    async fn corpus_text(&self) -> Result<String>;

    async fn set_corpus_text(&self, text: &str) -> Result<()>;
}
