//! The seam between the engine and whatever model turns text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text to fixed-length vectors whose geometry tracks meaning.
///
/// The engine embeds every chunk through [`embed_batch`](Self::embed_batch)
/// during a rebuild and each query through [`embed`](Self::embed). Both must
/// return vectors of exactly [`dimensions`](Self::dimensions) entries, and
/// identical input must map to an identical vector for the life of the
/// process. Vectors need not be normalized; the engine L2-normalizes them.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::EmbeddingProvider;
///
/// let provider = FastEmbedProvider::new("sentence-transformers/all-MiniLM-L6-v2")?;
/// provider.initialize().await?;
/// let vectors = provider.embed_batch(&["first chunk", "second chunk"]).await?;
/// assert!(vectors.iter().all(|v| v.len() == provider.dimensions()));
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Load model weights ahead of the first call.
    ///
    /// Called before every rebuild or restore, so it must be cheap once the
    /// model is loaded.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Embed one text, typically a query.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, returning one vector per input in input order.
    ///
    /// Falls back to one [`embed`](Self::embed) call per text; backends with
    /// native batching should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// Short backend name for logs and errors.
    fn name(&self) -> &str;
}
