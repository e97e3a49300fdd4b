//! Shared helpers for engine integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use docqa_rag::{EmbeddingProvider, RagConfig, RagError, RetrievalEngine};

pub const VOCABULARY: [&str; 14] = [
    "fox", "dog", "cat", "rust", "python", "memory", "safety", "garbage", "collector",
    "ownership", "vector", "search", "alpha", "beta",
];

/// Deterministic embeddings: one axis per vocabulary word, counting
/// occurrences. Words outside the vocabulary contribute nothing, so cosine
/// similarities can be worked out by hand.
pub struct KeywordEmbedding {
    vocabulary: Vec<&'static str>,
    batch_calls: AtomicUsize,
    embedded_chunks: AtomicUsize,
    fail: AtomicBool,
}

impl KeywordEmbedding {
    pub fn new() -> Self {
        Self::with_vocabulary(&VOCABULARY)
    }

    pub fn with_vocabulary(words: &[&'static str]) -> Self {
        Self {
            vocabulary: words.to_vec(),
            batch_calls: AtomicUsize::new(0),
            embedded_chunks: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let provider = Self::new();
        provider.fail.store(true, Ordering::SeqCst);
        provider
    }

    /// How many times a whole corpus was embedded.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn embedded_chunks(&self) -> usize {
        self.embedded_chunks.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let token = token.to_lowercase();
            if let Some(axis) = self.vocabulary.iter().position(|w| *w == token) {
                vector[axis] += 1.0;
            }
        }
        vector
    }

    fn check(&self) -> docqa_rag::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RagError::EmbeddingError {
                provider: "Keyword".into(),
                message: "backend unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedding {
    async fn embed(&self, text: &str) -> docqa_rag::Result<Vec<f32>> {
        self.check()?;
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> docqa_rag::Result<Vec<Vec<f32>>> {
        self.check()?;
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.embedded_chunks.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn name(&self) -> &str {
        "Keyword"
    }
}

pub fn config_for(root: &Path) -> RagConfig {
    RagConfig::builder()
        .documents_dir(root.join("documents"))
        .index_dir(root.join("vectorstore"))
        .chunk_size(500)
        .chunk_overlap(50)
        .similarity_threshold(0.5)
        .max_chunks_for_answer(3)
        .build()
        .unwrap()
}

pub fn engine_with(config: RagConfig, provider: Arc<KeywordEmbedding>) -> RetrievalEngine {
    RetrievalEngine::builder().config(config).embedding_provider(provider).build().unwrap()
}

pub fn write_doc(root: &Path, name: &str, text: &str) {
    let dir = root.join("documents");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), text).unwrap();
}
