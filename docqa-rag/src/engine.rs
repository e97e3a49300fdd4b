//! Retrieval engine: index lifecycle, threshold policy, and answering.
//!
//! The [`RetrievalEngine`] owns the indexed corpus. It restores the corpus
//! from an [`IndexStore`] on first use, rebuilds it from the documents folder
//! when nothing usable is stored, and answers queries against it.
//!
//! The corpus is published as one `Arc<RetrievalState>`. A rebuild assembles
//! a complete new state off to the side and installs it with a single swap,
//! so a concurrent search sees either the old corpus or the new one. Rebuilds
//! themselves are serialized by a mutex.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{RagConfig, RetrievalEngine};
//!
//! let engine = RetrievalEngine::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .build()?;
//!
//! engine.initialize().await?;
//! println!("{}", engine.answer("What does the fox jump over?").await?);
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::answer::{AnswerFormatter, ExtractiveFormatter};
use crate::chunking::{Chunker, WordBoundaryChunker};
use crate::config::RagConfig;
use crate::document::{ChunkMetadata, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::{FlatIndex, normalize_l2};
use crate::loader::{DocumentReadFailure, load_documents};
use crate::normalize::normalize;
use crate::state::RetrievalState;
use crate::store::IndexStore;

/// Whether the engine currently serves an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    /// Nothing loaded yet; the next call initializes.
    Uninitialized,
    /// An index is published and searchable.
    Ready,
}

/// Counters describing the published index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Distinct source files among the indexed chunks.
    pub documents: usize,
    /// Indexed chunks.
    pub chunks: usize,
    /// Vector dimension of the index (the provider's when uninitialized).
    pub dimension: usize,
    /// Lifecycle status.
    pub status: EngineStatus,
}

/// What a rebuild read and produced.
#[derive(Debug)]
pub struct RebuildReport {
    /// Documents read successfully.
    pub documents: usize,
    /// Chunks indexed.
    pub chunks: usize,
    /// Documents skipped because they could not be read.
    pub failures: Vec<DocumentReadFailure>,
}

/// The retrieval engine.
///
/// Construct one via [`RetrievalEngine::builder()`] and share it behind an
/// `Arc`; every method takes `&self`.
pub struct RetrievalEngine {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    formatter: Arc<dyn AnswerFormatter>,
    store: IndexStore,
    state: RwLock<Option<Arc<RetrievalState>>>,
    rebuild: Mutex<()>,
}

impl RetrievalEngine {
    /// Create a new [`RetrievalEngineBuilder`].
    pub fn builder() -> RetrievalEngineBuilder {
        RetrievalEngineBuilder::default()
    }

    /// Return a reference to the engine configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the index store.
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Load the embedding provider and the index. No-op once ready.
    ///
    /// A persisted index is reused when it loads cleanly and matches the
    /// provider's dimension; otherwise the index is rebuilt from the
    /// documents folder and saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to load, or if a rebuild
    /// fails (unreadable folder, embedding failure, dimension mismatch).
    /// A missing or corrupt persisted index is never an error.
    pub async fn initialize(&self) -> Result<()> {
        if self.is_ready().await {
            return Ok(());
        }
        let _guard = self.rebuild.lock().await;
        if self.is_ready().await {
            return Ok(());
        }

        info!(provider = self.embedding_provider.name(), "initializing retrieval engine");
        self.embedding_provider.initialize().await?;

        let expected = self.embedding_provider.dimensions();
        let state = match self.store.load().await {
            Ok(Some(state)) if state.index().dimension() == expected => state,
            Ok(Some(state)) => {
                warn!(
                    stored = state.index().dimension(),
                    expected, "persisted index has a different dimension, rebuilding"
                );
                self.rebuild_and_persist().await?.0
            }
            Ok(None) => {
                info!("no persisted index found, building a new one");
                self.rebuild_and_persist().await?.0
            }
            Err(e) => {
                warn!(error = %e, "persisted index unusable, rebuilding");
                self.rebuild_and_persist().await?.0
            }
        };

        let chunks = state.len();
        self.publish(state).await;
        info!(chunks, "retrieval engine ready");
        Ok(())
    }

    /// Rebuild the index from the current documents and persist it,
    /// ignoring anything stored.
    ///
    /// Searches running meanwhile keep using the previous index until the
    /// new one is complete. If the rebuild fails, the previous index stays
    /// in place.
    ///
    /// # Errors
    ///
    /// Same as the rebuild branch of [`initialize`](Self::initialize).
    pub async fn refresh(&self) -> Result<RebuildReport> {
        let _guard = self.rebuild.lock().await;
        info!("refreshing index");
        self.embedding_provider.initialize().await?;

        let (state, report) = self.rebuild_and_persist().await?;
        self.publish(state).await;
        Ok(report)
    }

    /// Return up to `k` chunks similar to `query`, best first.
    ///
    /// Initializes the engine if needed. Results scoring below the
    /// configured similarity threshold are dropped after ranking, so fewer
    /// than `k` results (or none) is normal.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if embedding the query fails,
    /// or any error from [`initialize`](Self::initialize).
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let state = self.snapshot().await?;
        if state.is_empty() {
            debug!("search on empty index");
            return Ok(Vec::new());
        }

        let query_text = normalize(query);
        let mut query_embedding =
            self.embedding_provider.embed(&query_text).await.map_err(|e| {
                error!(error = %e, "embedding failed during query");
                RagError::PipelineError(format!("query embedding failed: {e}"))
            })?;
        normalize_l2(&mut query_embedding);

        let neighbors = state.index().search(&query_embedding, k)?;

        let threshold = self.config.similarity_threshold;
        let results: Vec<SearchResult> = neighbors
            .into_iter()
            .filter(|n| n.score >= threshold)
            .filter_map(|n| {
                let metadata = state.metadata().get(n.position)?;
                Some(SearchResult {
                    text: state.chunks()[n.position].clone(),
                    score: n.score,
                    metadata: metadata.clone(),
                })
            })
            .collect();

        debug!(k, threshold, result_count = results.len(), "search completed");
        Ok(results)
    }

    /// Answer `query` from the best matching chunk.
    ///
    /// Returns the configured fallback answer when no chunk clears the
    /// similarity threshold.
    ///
    /// # Errors
    ///
    /// Any error from [`search`](Self::search).
    pub async fn answer(&self, query: &str) -> Result<String> {
        let results = self.search(query, self.config.max_chunks_for_answer).await?;

        let relevant = results
            .first()
            .is_some_and(|best| best.score >= self.config.similarity_threshold);
        if !relevant {
            info!(query, "no relevant chunk, answering with fallback");
            return Ok(self.config.fallback_answer.clone());
        }

        Ok(self.formatter.format(query, &results))
    }

    /// Counters for the published index.
    pub async fn stats(&self) -> IndexStats {
        match self.state.read().await.as_ref() {
            Some(state) => IndexStats {
                documents: state.document_count(),
                chunks: state.len(),
                dimension: state.index().dimension(),
                status: EngineStatus::Ready,
            },
            None => IndexStats {
                documents: 0,
                chunks: 0,
                dimension: self.embedding_provider.dimensions(),
                status: EngineStatus::Uninitialized,
            },
        }
    }

    /// Whether an index is published.
    pub async fn is_ready(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// The published index, if any.
    pub async fn current_state(&self) -> Option<Arc<RetrievalState>> {
        self.state.read().await.clone()
    }

    /// Drop the published index. The next call initializes again, which
    /// restores from the store when possible.
    pub async fn teardown(&self) {
        let _guard = self.rebuild.lock().await;
        self.state.write().await.take();
        info!("retrieval engine torn down");
    }

    async fn snapshot(&self) -> Result<Arc<RetrievalState>> {
        if let Some(state) = self.current_state().await {
            return Ok(state);
        }
        self.initialize().await?;
        self.current_state()
            .await
            .ok_or_else(|| RagError::PipelineError("engine was torn down during search".into()))
    }

    async fn publish(&self, state: RetrievalState) {
        *self.state.write().await = Some(Arc::new(state));
    }

    /// Load, normalize, chunk, embed and build, then save.
    ///
    /// A failed save is logged and the new state is still returned. An empty
    /// state clears the store instead of being saved.
    async fn rebuild_and_persist(&self) -> Result<(RetrievalState, RebuildReport)> {
        let loaded = load_documents(&self.config.documents_dir).await?;

        let mut chunks = Vec::new();
        let mut metadata = Vec::new();
        for document in &loaded.documents {
            let cleaned = normalize(&document.text);
            let pieces = self.chunker.chunk(&cleaned).map_err(|e| {
                error!(filename = %document.filename, error = %e, "chunking failed");
                e
            })?;
            debug!(filename = %document.filename, chunk_count = pieces.len(), "chunked document");

            for (chunk_id, piece) in pieces.into_iter().enumerate() {
                metadata.push(ChunkMetadata {
                    filename: document.filename.clone(),
                    chunk_id,
                    text: piece.clone(),
                });
                chunks.push(piece);
            }
        }

        let expected = self.embedding_provider.dimensions();
        let state = if chunks.is_empty() {
            info!(documents = loaded.documents.len(), "no chunks to index, using an empty index");
            RetrievalState::empty(expected)
        } else {
            let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
            let mut embeddings =
                self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
                    error!(chunk_count = texts.len(), error = %e, "embedding failed during rebuild");
                    RagError::PipelineError(format!("embedding failed during rebuild: {e}"))
                })?;
            if embeddings.len() != chunks.len() {
                return Err(RagError::PipelineError(format!(
                    "provider returned {} embeddings for {} chunks",
                    embeddings.len(),
                    chunks.len()
                )));
            }
            for embedding in &mut embeddings {
                normalize_l2(embedding);
            }

            let index = FlatIndex::build(embeddings)?;
            if index.dimension() != expected {
                return Err(RagError::DimensionMismatch { expected, actual: index.dimension() });
            }
            RetrievalState::new(index, chunks, metadata)?
        };

        // An empty corpus is never persisted, so the next start rebuilds and
        // sees documents added in the meantime.
        if state.is_empty() {
            if let Err(e) = self.store.clear().await {
                error!(error = %e, "failed to remove stale index artifacts");
            }
        } else if let Err(e) = self.store.save(&state).await {
            error!(error = %e, "failed to persist index, serving it from memory only");
        }

        let report = RebuildReport {
            documents: loaded.documents.len(),
            chunks: state.len(),
            failures: loaded.failures,
        };
        info!(
            documents = report.documents,
            chunks = report.chunks,
            skipped = report.failures.len(),
            "index rebuilt"
        );
        Ok((state, report))
    }
}

/// Builder for constructing a [`RetrievalEngine`].
///
/// `config` and `embedding_provider` are required. The chunker defaults to a
/// [`WordBoundaryChunker`] sized from the config, the formatter to an
/// [`ExtractiveFormatter`] using the configured fallback answer, and the
/// store to an [`IndexStore`] at `config.index_dir`.
///
/// # Example
///
/// ```rust,ignore
/// let engine = RetrievalEngine::builder()
///     .config(config)
///     .embedding_provider(Arc::new(embedder))
///     .index_store(IndexStore::new("/var/lib/docqa"))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RetrievalEngineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    formatter: Option<Arc<dyn AnswerFormatter>>,
    store: Option<IndexStore>,
}

impl RetrievalEngineBuilder {
    /// Set the engine configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Override the answer formatter.
    pub fn formatter(mut self, formatter: Arc<dyn AnswerFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Override the index store.
    pub fn index_store(mut self, store: IndexStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the [`RetrievalEngine`], validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or
    /// the configuration is invalid.
    pub fn build(self) -> Result<RetrievalEngine> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;

        let chunker =
            self.chunker.unwrap_or_else(|| Arc::new(WordBoundaryChunker::from_config(&config)));
        let formatter = self
            .formatter
            .unwrap_or_else(|| Arc::new(ExtractiveFormatter::new(config.fallback_answer.clone())));
        let store = self.store.unwrap_or_else(|| IndexStore::new(config.index_dir.clone()));

        Ok(RetrievalEngine {
            config,
            embedding_provider,
            chunker,
            formatter,
            store,
            state: RwLock::new(None),
            rebuild: Mutex::new(()),
        })
    }
}
