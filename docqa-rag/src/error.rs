//! Error types for the `docqa-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while indexing documents or answering queries.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A single document could not be read. Recorded in the load report,
    /// never aborts a whole load.
    #[error("Failed to read document {}: {source}", path.display())]
    DocumentRead {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O or decoding failure.
        #[source]
        source: std::io::Error,
    },

    /// The persisted index could not be restored. Callers fall back to a
    /// full rebuild.
    #[error("Index load error: {0}")]
    IndexLoad(String),

    /// Writing an index artifact failed.
    #[error("Index store error ({}): {source}", path.display())]
    Store {
        /// The artifact being written.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Vectors of inconsistent length reached the index.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the index was built with.
        expected: usize,
        /// The offending vector's length.
        actual: usize,
    },

    /// An error occurred during document chunking.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the retrieval engine orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// An I/O error outside of per-document reads and store writes.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
