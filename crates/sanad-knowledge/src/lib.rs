//! # Sanad Knowledge
//!
//! Retrieval-augmented answering over a single operator-supplied corpus.
//! No vector database: the whole index lives in memory and is rebuilt
//! wholesale whenever the corpus text changes.
//!
//! ## How it works
//! ```text
//! User: "متى يبدأ التسجيل؟"
//!   ↓ lang::detect            → ar
//!   ↓ Embedder::embed_one     → query vector
//!   ↓ ranker::rank            → cosine similarity over every chunk
//! Top 3 chunks
//!   ↓ Synthesizer             → LLM answer, or raw chunks, or apology
//! Reply in the asker's language
//! ```

pub mod chunker;
pub mod corpus;
pub mod index;
pub mod lang;
pub mod ranker;
pub mod retriever;
pub mod synthesizer;

pub use chunker::Chunker;
pub use corpus::InMemoryCorpus;
pub use index::CorpusIndex;
pub use retriever::Retriever;
pub use synthesizer::{Synthesizer, SynthesizerConfig};
