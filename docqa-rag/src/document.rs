//! Data types for documents, chunk metadata, and search results.

use serde::{Deserialize, Serialize};

/// A source document read from the documents folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// The file name, unique within the folder.
    pub filename: String,
    /// The raw, un-normalized file contents.
    pub text: String,
}

impl Document {
    /// Create a document from a file name and its contents.
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self { filename: filename.into(), text: text.into() }
    }
}

/// Where a chunk came from.
///
/// Stored in an array parallel to the chunk texts: entry `i` describes
/// chunk `i`, and `text` always equals that chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// The source document's file name.
    pub filename: String,
    /// The chunk's 0-based position within its source document.
    pub chunk_id: usize,
    /// The chunk text.
    pub text: String,
}

/// A retrieved chunk paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The chunk text.
    pub text: String,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
    /// The chunk's metadata record.
    pub metadata: ChunkMetadata,
}
