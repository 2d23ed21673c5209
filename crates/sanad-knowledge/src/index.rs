//! In-memory corpus index: chunks paired positionally with their vectors.

use sanad_core::error::{Result, SanadError};
use sanad_core::types::{Chunk, EmbeddingVector};

/// Chunks and embeddings built from one corpus snapshot.
///
/// Never mutated after construction; a corpus change produces a whole new
/// index that replaces this one.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<EmbeddingVector>,
}

impl CorpusIndex {
    /// Pair `chunks[i]` with `vectors[i]`. Unequal lengths are rejected.
    pub fn new(chunks: Vec<Chunk>, vectors: Vec<EmbeddingVector>) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(SanadError::IndexMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }
        Ok(Self { chunks, vectors })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn vectors(&self) -> &[EmbeddingVector] {
        &self.vectors
    }

    /// Dimension of the stored vectors (0 for an empty index).
    pub fn dimension(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Chunk, &EmbeddingVector)> {
        self.chunks.iter().zip(self.vectors.iter())
    }
}
