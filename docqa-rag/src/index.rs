//! Exhaustive inner-product vector index.
//!
//! [`FlatIndex`] stores vectors contiguously and compares a query against
//! every one of them. Vectors are expected to be L2-normalized by the caller
//! (see [`normalize_l2`]) so the inner product is the cosine similarity.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// One search hit: a score and the stored vector's insertion position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Inner product between the query and the stored vector.
    pub score: f32,
    /// Position of the stored vector, in insertion order.
    pub position: usize,
}

/// An append-only flat index over fixed-dimension vectors.
///
/// # Example
///
/// ```rust
/// use docqa_rag::FlatIndex;
///
/// let index = FlatIndex::build(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
/// let hits = index.search(&[0.0, 1.0], 1).unwrap();
/// assert_eq!(hits[0].position, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimension` entries.
    pub fn new(dimension: usize) -> Self {
        Self { dimension, data: Vec::new() }
    }

    /// Build an index over `vectors`; the first vector fixes the dimension.
    ///
    /// An empty input yields an empty index of dimension zero.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the vectors differ in length.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = vectors.first().map_or(0, Vec::len);
        let mut index = Self::new(dimension);
        index.data.reserve(dimension * vectors.len());
        for vector in &vectors {
            index.add(vector)?;
        }
        Ok(index)
    }

    /// Rebuild an index from its dimension and row-major vector data.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexLoad`] if `data` is not a whole number of
    /// vectors.
    pub fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 && !data.is_empty() {
            return Err(RagError::IndexLoad("vector data present for a zero dimension".into()));
        }
        if dimension > 0 && data.len() % dimension != 0 {
            return Err(RagError::IndexLoad(format!(
                "{} floats is not a multiple of dimension {dimension}",
                data.len()
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Append one vector.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the vector has the wrong
    /// length.
    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// The vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 { 0 } else { self.data.len() / self.dimension }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The stored vector at `position`, if any.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Row-major vector data, `len() * dimension()` floats.
    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }

    /// Return the `k` stored vectors with the highest inner product.
    ///
    /// Results are ordered by descending score; equal scores keep insertion
    /// order. `k` is clamped to [`len`](Self::len), and an empty index
    /// returns no results for any query.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the index is non-empty
    /// and the query has the wrong length.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| Neighbor { score: inner_product(vector, query), position })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.position.cmp(&b.position)));
        scored.truncate(k.min(self.len()));
        Ok(scored)
    }
}

/// Dot product of two equal-length vectors.
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale a vector to unit L2 norm in place. Zero vectors are left as is.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
