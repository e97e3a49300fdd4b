//! The indexed corpus: vector index plus its parallel chunk and metadata arrays.

use std::collections::HashSet;

use crate::document::ChunkMetadata;
use crate::error::{RagError, Result};
use crate::index::FlatIndex;

/// A consistent snapshot of everything a search reads.
///
/// Position `i` in the index, in `chunks` and in `metadata` all describe the
/// same chunk. The only constructors check this, so a value of this type is
/// always aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalState {
    index: FlatIndex,
    chunks: Vec<String>,
    metadata: Vec<ChunkMetadata>,
}

impl RetrievalState {
    /// Assemble a state from its three parts.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if the arrays differ in length
    /// from each other or from the index, or if a metadata record's text
    /// differs from its chunk.
    pub fn new(index: FlatIndex, chunks: Vec<String>, metadata: Vec<ChunkMetadata>) -> Result<Self> {
        if chunks.len() != metadata.len() {
            return Err(RagError::PipelineError(format!(
                "{} chunks but {} metadata records",
                chunks.len(),
                metadata.len()
            )));
        }
        if index.len() != chunks.len() {
            return Err(RagError::PipelineError(format!(
                "index holds {} vectors for {} chunks",
                index.len(),
                chunks.len()
            )));
        }
        if let Some(i) = chunks.iter().zip(&metadata).position(|(chunk, meta)| *chunk != meta.text) {
            return Err(RagError::PipelineError(format!(
                "metadata text at position {i} does not match its chunk"
            )));
        }
        Ok(Self { index, chunks, metadata })
    }

    /// A searchable state with no chunks.
    pub fn empty(dimension: usize) -> Self {
        Self { index: FlatIndex::new(dimension), chunks: Vec::new(), metadata: Vec::new() }
    }

    /// The vector index.
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Chunk texts, in index order.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Chunk metadata, in index order.
    pub fn metadata(&self) -> &[ChunkMetadata] {
        &self.metadata
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of distinct source files among the indexed chunks.
    pub fn document_count(&self) -> usize {
        self.metadata.iter().map(|m| m.filename.as_str()).collect::<HashSet<_>>().len()
    }
}
