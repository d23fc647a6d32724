use std::cmp::Ordering;

use rayon::prelude::*;
use thiserror::Error;

/// Error types for the vector index
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Cannot build an index from zero vectors")]
    EmptyInput,
}

/// A single search hit: row index into the index plus its inner-product score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub score: f32,
}

/// Exact inner-product index over unit vectors
///
/// Rows are stored contiguously in a single buffer. Since every vector is expected
/// to have unit length, the inner product is the cosine similarity.
/// The index is immutable once built and can be shared across threads.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dim: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Builds the index from `N` vectors of equal dimension; row `i` is `vectors[i]`
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self, IndexError> {
        let first = vectors.first().ok_or(IndexError::EmptyInput)?;
        let dim = first.len();
        if dim == 0 {
            return Err(IndexError::EmptyInput);
        }

        let mut data = Vec::with_capacity(dim * vectors.len());
        for vector in vectors {
            if vector.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    got: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self { dim, data })
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Direct lookup of the stored vector at `row`
    pub fn vector(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    /// Returns the `min(k, N)` rows with the highest inner product against `query`
    ///
    /// Results are sorted by score descending; equal scores are ordered by
    /// ascending row index so that output is reproducible.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                got: query.len(),
            });
        }

        let mut hits: Vec<Neighbor> = self
            .data
            .par_chunks_exact(self.dim)
            .enumerate()
            .map(|(row, vector)| Neighbor {
                row,
                score: dot(query, vector),
            })
            .collect();

        let k = k.min(hits.len());
        if k == 0 {
            return Ok(Vec::new());
        }
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, rank);
            hits.truncate(k);
        }
        hits.sort_unstable_by(rank);

        Ok(hits)
    }
}

/// Score descending, then row ascending
fn rank(a: &Neighbor, b: &Neighbor) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.row.cmp(&b.row))
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
