//! Extractive question answering over a folder of text documents.
//!
//! Documents are normalized, split into overlapping chunks, embedded, and
//! stored in an exhaustive inner-product index. A query is embedded the same
//! way; the best chunks above a similarity threshold are returned, and the
//! top one is quoted as the answer.
//!
//! - [`normalize`] and [`split_into_chunks`] prepare text
//! - [`load_documents`] reads the documents folder
//! - [`EmbeddingProvider`] maps text to vectors
//!   ([`local::FastEmbedProvider`] behind the `fastembed` feature)
//! - [`FlatIndex`] searches vectors, [`IndexStore`] persists them
//! - [`RetrievalEngine`] ties it together and owns the index lifecycle
//! - [`AnswerFormatter`] renders the answer text

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod loader;
mod normalize;
pub mod state;
pub mod store;

#[cfg(feature = "fastembed")]
pub mod local;

pub use answer::{AnswerFormatter, ExtractiveFormatter};
pub use chunking::{Chunker, WordBoundaryChunker, split_into_chunks};
pub use config::{DEFAULT_FALLBACK_ANSWER, RagConfig, RagConfigBuilder};
pub use document::{ChunkMetadata, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use engine::{EngineStatus, IndexStats, RebuildReport, RetrievalEngine, RetrievalEngineBuilder};
pub use error::{RagError, Result};
pub use index::{FlatIndex, Neighbor, inner_product, normalize_l2};
pub use loader::{DocumentReadFailure, LoadReport, SUPPORTED_EXTENSIONS, load_documents};
pub use normalize::normalize;
pub use state::RetrievalState;
pub use store::IndexStore;
