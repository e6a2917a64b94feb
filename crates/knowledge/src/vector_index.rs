//! Vector index abstraction and the exhaustive flat index.
//!
//! An index holds only vectors. Search results are positions into the batch
//! the index was built from, which the retriever maps back to documents.

use concierge_core::{AppError, AppResult};

/// Trait for vector index backends.
///
/// Implementations must:
/// - Replace their whole contents on `build`
/// - Treat an empty build as a valid state in which every search is empty
/// - Return at most `k` hits in ascending distance, ties by ascending position
pub trait VectorIndex: Send + Sync {
    /// Replace the index contents with `vectors`.
    ///
    /// On error the previous contents are left untouched.
    fn build(&mut self, vectors: Vec<Vec<f32>>) -> AppResult<()>;

    /// Find the `k` nearest vectors to `query`.
    ///
    /// Returns `(position, squared_distance)` pairs.
    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>>;

    /// Number of indexed vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension, or `None` while the index is empty.
    fn dimension(&self) -> Option<usize>;
}

/// Brute-force index over a contiguous vector buffer.
///
/// Every search scans all vectors. That is the right trade-off for the small
/// corpora this crate targets; an approximate index can replace it behind
/// the `VectorIndex` trait.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    dimension: Option<usize>,
    data: Vec<f32>,
    count: usize,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorIndex for FlatIndex {
    fn build(&mut self, vectors: Vec<Vec<f32>>) -> AppResult<()> {
        let Some(first) = vectors.first() else {
            *self = Self::default();
            tracing::debug!("Vector index built empty");
            return Ok(());
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(AppError::InvalidArgument(
                "Cannot index zero-dimension vectors".to_string(),
            ));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(AppError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let count = vectors.len();
        let mut data = Vec::with_capacity(count * dimension);
        for vector in vectors {
            data.extend(vector);
        }

        *self = Self {
            dimension: Some(dimension),
            data,
            count,
        };

        tracing::debug!("Vector index built: {} vectors, dimension {}", count, dimension);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>> {
        if k == 0 {
            return Err(AppError::InvalidArgument(
                "top_k must be greater than zero".to_string(),
            ));
        }

        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };

        if query.len() != dimension {
            return Err(AppError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(dimension)
            .map(|vector| squared_euclidean(query, vector))
            .enumerate()
            .collect();

        let by_distance_then_position =
            |a: &(usize, f32), b: &(usize, f32)| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0));

        let k = k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_distance_then_position);
            scored.truncate(k);
        }
        scored.sort_by(by_distance_then_position);

        Ok(scored)
    }

    fn len(&self) -> usize {
        self.count
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

/// Squared Euclidean distance; callers guarantee equal lengths.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
