//! Retrieval orchestrator. Owns the corpus index and answers queries.
//!
//! ```text
//!            build requested           build succeeded
//!   Empty ───────────────────▶ Building ───────────────▶ Ready
//!     ▲                           │                        │
//!     └──────── build failed ─────┘                        │
//!     └──────────────────── corpus changed ────────────────┘
//! ```
//!
//! Only the transition into `Ready` is serialized. Queries take an `Arc`
//! snapshot of the index and never hold a lock across a model call, so a
//! rebuild replaces the index without disturbing in-flight queries.

use sanad_core::config::SanadConfig;
use sanad_core::error::{Result, SanadError};
use sanad_core::traits::{CorpusSource, Embedder, Generator};
use sanad_core::types::{IndexState, IndexStatus, QueryOutcome, ResponseTier};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::chunker::Chunker;
use crate::index::CorpusIndex;
use crate::synthesizer::{self, Synthesizer, SynthesizerConfig};
use crate::{lang, ranker};

pub const DEFAULT_TOP_K: usize = 3;

/// Clears the building flag however the build ends, including cancellation.
struct BuildingGuard<'a>(&'a AtomicBool);

impl<'a> BuildingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BuildingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The "answer this query" entry point.
pub struct Retriever {
    corpus: Arc<dyn CorpusSource>,
    embedder: Arc<dyn Embedder>,
    synthesizer: Synthesizer,
    chunker: Chunker,
    top_k: usize,
    index: RwLock<Option<Arc<CorpusIndex>>>,
    build_lock: tokio::sync::Mutex<()>,
    building: AtomicBool,
    /// Bumped on every corpus change; a build only installs its index if
    /// no change happened while it ran.
    generation: AtomicU64,
}

impl Retriever {
    pub fn new(
        corpus: Arc<dyn CorpusSource>,
        embedder: Arc<dyn Embedder>,
        synthesizer: Synthesizer,
        chunker: Chunker,
        top_k: usize,
    ) -> Self {
        Self {
            corpus,
            embedder,
            synthesizer,
            chunker,
            top_k: top_k.max(1),
            index: RwLock::new(None),
            build_lock: tokio::sync::Mutex::new(()),
            building: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Wire a retriever from configuration. `generator` may be `None` to run
    /// purely extractive.
    pub fn from_config(
        config: &SanadConfig,
        corpus: Arc<dyn CorpusSource>,
        embedder: Arc<dyn Embedder>,
        generator: Option<Arc<dyn Generator>>,
    ) -> Self {
        let retrieval = &config.retrieval;
        let synthesizer = Synthesizer::new(
            generator,
            SynthesizerConfig::from_config(&config.llm, retrieval, &config.identity),
        );
        let chunker = Chunker::new(retrieval.chunk_size, retrieval.chunk_overlap)
            .with_source_name(retrieval.source_name.clone());
        Self::new(corpus, embedder, synthesizer, chunker, retrieval.top_k)
    }

    /// Answer `query`, returning only the reply text.
    pub async fn answer(&self, query: &str) -> Result<String> {
        Ok(self.answer_with_outcome(query).await?.reply)
    }

    /// Answer `query` and report which rung of the ladder produced it.
    ///
    /// An empty corpus yields the apology without touching any model.
    /// Index build and query embedding failures propagate; generation
    /// failures degrade inside the synthesizer.
    pub async fn answer_with_outcome(&self, query: &str) -> Result<QueryOutcome> {
        let language = lang::detect(query);

        let index = match self.ensure_index().await {
            Ok(index) => index,
            Err(SanadError::EmptyCorpus) => {
                tracing::warn!("No corpus text available, replying with apology");
                return Ok(QueryOutcome {
                    reply: synthesizer::apology(language).to_string(),
                    tier: ResponseTier::Apology,
                });
            }
            Err(e) => return Err(e),
        };

        let query_vector = self.embedder.embed_one(query).await?;
        let top = ranker::top_k(&query_vector, &index, self.top_k);

        let scores: Vec<String> = top.iter().map(|r| format!("{:.3}", r.similarity)).collect();
        tracing::debug!("Top {} similarity scores: {}", top.len(), scores.join(", "));

        let outcome = self.synthesizer.synthesize(query, &top, language).await;
        tracing::info!(
            "Answered {} query via {} tier ({} chars)",
            language,
            outcome.tier,
            outcome.reply.chars().count()
        );
        Ok(outcome)
    }

    /// The current index, building it first if needed. At most one build
    /// runs at a time; callers arriving mid-build wait for it and reuse its
    /// result.
    pub async fn ensure_index(&self) -> Result<Arc<CorpusIndex>> {
        if let Some(index) = self.snapshot() {
            return Ok(index);
        }

        let _build = self.build_lock.lock().await;
        if let Some(index) = self.snapshot() {
            return Ok(index);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let index = {
            let _building = BuildingGuard::enter(&self.building);
            Arc::new(self.build().await?)
        };

        // Compare and install under the same guard `invalidate` bumps under,
        // so an invalidation cannot slip in between.
        let mut slot = self.index.write().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::SeqCst) == generation {
            *slot = Some(index.clone());
        } else {
            tracing::info!("Corpus changed during build, not caching the stale index");
        }
        drop(slot);
        Ok(index)
    }

    /// Drop the index and build a fresh one from the current corpus.
    pub async fn rebuild(&self) -> Result<IndexStatus> {
        self.invalidate();
        self.ensure_index().await?;
        Ok(self.index_status())
    }

    /// Forget the current index; the next query rebuilds it.
    pub fn invalidate(&self) {
        let mut slot = self.index.write().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::SeqCst);
        *slot = None;
        drop(slot);
        tracing::info!("Corpus index invalidated");
    }

    /// Replace the corpus text and invalidate the index.
    pub async fn set_corpus_text(&self, text: &str) -> Result<()> {
        self.corpus.set_corpus_text(text).await?;
        self.invalidate();
        Ok(())
    }

    pub fn state(&self) -> IndexState {
        if self.snapshot().is_some() {
            IndexState::Ready
        } else if self.building.load(Ordering::SeqCst) {
            IndexState::Building
        } else {
            IndexState::Empty
        }
    }

    pub fn index_status(&self) -> IndexStatus {
        let (chunk_count, vector_count) = self
            .snapshot()
            .map_or((0, 0), |index| (index.chunks().len(), index.vectors().len()));
        IndexStatus {
            state: self.state(),
            chunk_count,
            vector_count,
        }
    }

    fn snapshot(&self) -> Option<Arc<CorpusIndex>> {
        self.index.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn build(&self) -> Result<CorpusIndex> {
        let text = self.corpus.corpus_text().await?;
        if text.trim().is_empty() {
            return Err(SanadError::EmptyCorpus);
        }

        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(SanadError::EmptyCorpus);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await.map_err(|e| {
            tracing::error!("Failed to embed {} chunks: {e}", texts.len());
            e
        })?;

        let index = CorpusIndex::new(chunks, vectors)?;
        tracing::info!(
            "Corpus index built: {} chunks, dimension {}",
            index.len(),
            index.dimension()
        );
        Ok(index)
    }
}
