//! Local sentence-transformer embeddings through `fastembed` (ONNX runtime).
//!
//! This module is only available when the `fastembed` feature is enabled.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "FastEmbed";

/// Model identifiers this provider understands, with their output dimension.
const KNOWN_MODELS: [(&str, EmbeddingModel, usize); 3] = [
    ("sentence-transformers/all-MiniLM-L6-v2", EmbeddingModel::AllMiniLML6V2, 384),
    ("sentence-transformers/all-MiniLM-L12-v2", EmbeddingModel::AllMiniLML12V2, 384),
    ("BAAI/bge-small-en-v1.5", EmbeddingModel::BGESmallENV15, 384),
];

/// An [`EmbeddingProvider`] that runs a sentence-transformer model locally.
///
/// The model is downloaded and loaded on [`initialize`](EmbeddingProvider::initialize)
/// (or lazily on first use) and shared behind a mutex; inference runs on
/// tokio's blocking pool.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::local::FastEmbedProvider;
///
/// let provider = FastEmbedProvider::new("sentence-transformers/all-MiniLM-L6-v2")?;
/// provider.initialize().await?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), 384);
/// ```
pub struct FastEmbedProvider {
    model_id: String,
    model: EmbeddingModel,
    dimensions: usize,
    engine: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model_id", &self.model_id)
            .field("dimensions", &self.dimensions)
            .field("loaded", &self.engine.initialized())
            .finish()
    }
}

impl FastEmbedProvider {
    /// Create a provider for one of the supported model identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] for an unknown model identifier.
    pub fn new(model_id: impl Into<String>) -> Result<Self> {
        let model_id = model_id.into();
        let (_, model, dimensions) = KNOWN_MODELS
            .iter()
            .find(|(id, _, _)| *id == model_id)
            .cloned()
            .ok_or_else(|| {
                let known: Vec<&str> = KNOWN_MODELS.iter().map(|(id, _, _)| *id).collect();
                RagError::ConfigError(format!(
                    "unsupported embedding model '{model_id}' (supported: {})",
                    known.join(", ")
                ))
            })?;

        Ok(Self { model_id, model, dimensions, engine: OnceCell::new() })
    }

    /// The configured model identifier.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn engine(&self) -> Result<Arc<Mutex<TextEmbedding>>> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                info!(model = %self.model_id, "loading embedding model");
                let model = self.model.clone();
                let loaded = tokio::task::spawn_blocking(move || {
                    TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(false))
                })
                .await
                .map_err(|e| embedding_error(format!("model loading task failed: {e}")))?
                .map_err(|e| embedding_error(format!("failed to load model: {e}")))?;
                info!(model = %self.model_id, "embedding model ready");
                Ok::<_, RagError>(Arc::new(Mutex::new(loaded)))
            })
            .await?;
        Ok(Arc::clone(engine))
    }
}

fn embedding_error(message: String) -> RagError {
    RagError::EmbeddingError { provider: PROVIDER.into(), message }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn initialize(&self) -> Result<()> {
        self.engine().await.map(|_| ())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| embedding_error("model returned no embedding".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model_id, "embedding batch");

        let engine = self.engine().await?;
        let owned: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();
        let embeddings = tokio::task::spawn_blocking(move || {
            let mut model =
                engine.lock().map_err(|_| embedding_error("model mutex poisoned".into()))?;
            model.embed(owned, None).map_err(|e| embedding_error(format!("inference failed: {e}")))
        })
        .await
        .map_err(|e| embedding_error(format!("inference task failed: {e}")))??;

        if embeddings.len() != texts.len() {
            return Err(embedding_error(format!(
                "expected {} embeddings, model returned {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_model_ids() {
        let provider = FastEmbedProvider::new("sentence-transformers/all-MiniLM-L6-v2").unwrap();
        assert_eq!(provider.dimensions(), 384);
        assert_eq!(provider.model_id(), "sentence-transformers/all-MiniLM-L6-v2");
    }

    #[test]
    fn rejects_unknown_model_ids() {
        let err = FastEmbedProvider::new("microsoft/DialoGPT-medium").unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }
}
