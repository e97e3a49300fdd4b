//! On-disk persistence for a [`RetrievalState`].
//!
//! Three artifacts live side by side in one folder:
//!
//! - `flat.index`: the vectors, bincode-encoded with a small header
//! - `chunks.json`: the chunk texts
//! - `metadata.json`: the chunk metadata records
//!
//! Saving is not atomic. A save interrupted half way leaves artifacts that
//! disagree with each other, which the next [`IndexStore::load`] reports as
//! [`RagError::IndexLoad`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bincode::Options;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::ChunkMetadata;
use crate::error::{RagError, Result};
use crate::index::FlatIndex;
use crate::state::RetrievalState;

const INDEX_FILE: &str = "flat.index";
const CHUNKS_FILE: &str = "chunks.json";
const METADATA_FILE: &str = "metadata.json";

const INDEX_MAGIC: [u8; 4] = *b"DQFI";
const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct IndexHeaderRef<'a> {
    magic: [u8; 4],
    version: u32,
    dimension: u64,
    data: &'a [f32],
}

#[derive(Deserialize)]
struct IndexHeader {
    magic: [u8; 4],
    version: u32,
    dimension: u64,
    data: Vec<f32>,
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding().with_little_endian()
}

/// Reads and writes the persisted index for one folder.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    /// Create a store rooted at `dir`. Nothing is touched until the first
    /// save or load.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The storage folder.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifacts(&self) -> [PathBuf; 3] {
        [self.dir.join(INDEX_FILE), self.dir.join(CHUNKS_FILE), self.dir.join(METADATA_FILE)]
    }

    /// Whether all three artifacts are present.
    pub async fn exists(&self) -> bool {
        for path in self.artifacts() {
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return false;
            }
        }
        true
    }

    /// Write the index, chunk and metadata artifacts, creating the folder
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Store`] naming the artifact that failed.
    pub async fn save(&self, state: &RetrievalState) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| RagError::Store { path: self.dir.clone(), source })?;

        let [index_path, chunks_path, metadata_path] = self.artifacts();

        let header = IndexHeaderRef {
            magic: INDEX_MAGIC,
            version: INDEX_FORMAT_VERSION,
            dimension: state.index().dimension() as u64,
            data: state.index().as_raw(),
        };
        let index_bytes = bincode_options()
            .serialize(&header)
            .map_err(|e| RagError::Store { path: index_path.clone(), source: std::io::Error::other(e) })?;
        write_artifact(&index_path, &index_bytes).await?;

        let chunk_bytes = serde_json::to_vec(state.chunks())
            .map_err(|e| RagError::Store { path: chunks_path.clone(), source: e.into() })?;
        write_artifact(&chunks_path, &chunk_bytes).await?;

        let metadata_bytes = serde_json::to_vec(state.metadata())
            .map_err(|e| RagError::Store { path: metadata_path.clone(), source: e.into() })?;
        write_artifact(&metadata_path, &metadata_bytes).await?;

        info!(dir = %self.dir.display(), chunks = state.len(), "saved index");
        Ok(())
    }

    /// Restore a previously saved state.
    ///
    /// Returns `Ok(None)` unless all three artifacts exist.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexLoad`] for unreadable, corrupt, or mutually
    /// inconsistent artifacts. Callers should rebuild rather than fail.
    pub async fn load(&self) -> Result<Option<RetrievalState>> {
        if !self.exists().await {
            debug!(dir = %self.dir.display(), "no persisted index");
            return Ok(None);
        }

        let [index_path, chunks_path, metadata_path] = self.artifacts();

        let index_bytes = read_artifact(&index_path).await?;
        let header: IndexHeader = bincode_options()
            .with_limit(index_bytes.len() as u64)
            .deserialize(&index_bytes)
            .map_err(|e| RagError::IndexLoad(format!("{}: {e}", index_path.display())))?;
        if header.magic != INDEX_MAGIC {
            return Err(RagError::IndexLoad(format!("{}: not an index file", index_path.display())));
        }
        if header.version != INDEX_FORMAT_VERSION {
            return Err(RagError::IndexLoad(format!(
                "{}: unsupported format version {}",
                index_path.display(),
                header.version
            )));
        }
        let dimension = usize::try_from(header.dimension)
            .map_err(|_| RagError::IndexLoad(format!("dimension {} too large", header.dimension)))?;
        let index = FlatIndex::from_raw(dimension, header.data)?;

        let chunks: Vec<String> = serde_json::from_slice(&read_artifact(&chunks_path).await?)
            .map_err(|e| RagError::IndexLoad(format!("{}: {e}", chunks_path.display())))?;
        let metadata: Vec<ChunkMetadata> =
            serde_json::from_slice(&read_artifact(&metadata_path).await?)
                .map_err(|e| RagError::IndexLoad(format!("{}: {e}", metadata_path.display())))?;

        let state = RetrievalState::new(index, chunks, metadata)
            .map_err(|e| RagError::IndexLoad(format!("inconsistent artifacts: {e}")))?;

        info!(dir = %self.dir.display(), chunks = state.len(), "restored index");
        Ok(Some(state))
    }

    /// Delete the three artifacts. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Store`] if a present artifact cannot be removed.
    pub async fn clear(&self) -> Result<()> {
        for path in self.artifacts() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "removed index artifact"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(RagError::Store { path, source }),
            }
        }
        Ok(())
    }
}

async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| RagError::Store { path: path.to_path_buf(), source })
}

async fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| RagError::IndexLoad(format!("{}: {e}", path.display())))
}
