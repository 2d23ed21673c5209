//! Domain types passed between the retrieval pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of an inbound message. Derived per message, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    #[default]
    En,
    Ar,
}

impl LanguageTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded contiguous excerpt of the corpus, the unit of retrieval.
///
/// Identity is `(source_name, index)`. `total_chunks` is the length of the
/// sequence the chunk was produced in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub source_name: String,
    pub index: usize,
    pub total_chunks: usize,
}

/// Fixed-length numeric representation of a text.
pub type EmbeddingVector = Vec<f32>;

/// A chunk scored against one query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

/// Which rung of the fallback ladder produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTier {
    Generated,
    RawChunks,
    BestChunk,
    Apology,
}

impl fmt::Display for ResponseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Generated => "generated",
            Self::RawChunks => "raw_chunks",
            Self::BestChunk => "best_chunk",
            Self::Apology => "apology",
        };
        f.write_str(s)
    }
}

/// Final reply plus the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub reply: String,
    pub tier: ResponseTier,
}

/// Lifecycle of the in-memory corpus index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    Empty,
    Building,
    Ready,
}

/// Observability snapshot of the corpus index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatus {
    pub state: IndexState,
    pub chunk_count: usize,
    pub vector_count: usize,
}

/// A message arriving from a chat front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub conversation_id: String,
    pub text: String,
    /// Sent by the bot's own account.
    #[serde(default)]
    pub from_me: bool,
    /// Group chat or status broadcast.
    #[serde(default)]
    pub is_group: bool,
}

impl IncomingMessage {
    pub fn direct(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            text: text.into(),
            from_me: false,
            is_group: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tag_serde() {
        assert_eq!(serde_json::to_string(&LanguageTag::Ar).unwrap(), "\"ar\"");
        let tag: LanguageTag = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(tag, LanguageTag::En);
        assert_eq!(LanguageTag::default(), LanguageTag::En);
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(ResponseTier::RawChunks.to_string(), "raw_chunks");
        assert_eq!(ResponseTier::Apology.to_string(), "apology");
    }
}
