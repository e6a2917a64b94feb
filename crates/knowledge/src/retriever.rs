//! Semantic document retrieval.
//!
//! Composes a `DocumentStore`, an `EmbeddingProvider` and a `VectorIndex`.
//! Index position `i` always refers to document `i` of the store.

use crate::document::DocumentStore;
use crate::embeddings::EmbeddingProvider;
use crate::vector_index::{FlatIndex, VectorIndex};
use concierge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

pub use concierge_core::config::DEFAULT_TOP_K;

/// A retrieved document with its distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    /// Document identifier (file name)
    pub id: String,

    /// Full document content
    pub content: String,

    /// Squared Euclidean distance; lower is more similar
    pub score: f32,
}

/// Read-only retrieval over a fixed corpus.
///
/// Built once at startup; `query` takes `&self` and can run from any number
/// of tasks at once.
pub struct Retriever {
    store: DocumentStore,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Box<dyn VectorIndex>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("documents", &self.store.len())
            .field("embedder", &self.embedder)
            .field("dimension", &self.index.dimension())
            .finish()
    }
}

impl Retriever {
    /// Embed every document and build a flat index over the vectors.
    ///
    /// # Errors
    /// * `AppError::Embedding` - If the embedder fails or returns the wrong number of vectors
    /// * `AppError::DimensionMismatch` - If the embedder returns vectors of mixed sizes
    pub async fn build(store: DocumentStore, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        let mut index: Box<dyn VectorIndex> = Box::new(FlatIndex::new());
        let start = Instant::now();

        tracing::info!(
            "Building index for {} documents using provider '{}' (model: {})",
            store.len(),
            embedder.provider_name(),
            embedder.model_name()
        );

        let vectors = embedder.embed_batch(&store.contents()).await?;

        if vectors.len() != store.len() {
            return Err(AppError::Embedding(format!(
                "Embedder returned {} vectors for {} documents",
                vectors.len(),
                store.len()
            )));
        }

        index.build(vectors)?;

        tracing::info!(
            "Index ready: {} vectors in {:.2}s",
            index.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            store,
            embedder,
            index,
        })
    }

    /// Retrieve the `k` documents nearest to `text`, closest first.
    ///
    /// An empty corpus yields `Ok(vec![])` without calling the embedder.
    ///
    /// # Errors
    /// * `AppError::InvalidArgument` - If `k` is zero
    /// * `AppError::Embedding` - If the query cannot be embedded
    /// * `AppError::DimensionMismatch` - If the query vector does not match the index
    pub async fn query(&self, text: &str, k: usize) -> AppResult<Vec<QueryHit>> {
        if k == 0 {
            return Err(AppError::InvalidArgument(
                "top_k must be greater than zero".to_string(),
            ));
        }

        if self.index.is_empty() {
            tracing::debug!("Query against empty index, no documents to return");
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(text).await?;
        let nearest = self.index.search(&query_vector, k)?;

        let hits = nearest
            .into_iter()
            .map(|(position, score)| {
                let doc = self.store.get(position).ok_or_else(|| {
                    AppError::Other(format!(
                        "Index position {} has no document ({} loaded)",
                        position,
                        self.store.len()
                    ))
                })?;
                Ok(QueryHit {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    score,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::debug!(
            "Retrieved {} documents for query ({} chars), best score {:?}",
            hits.len(),
            text.len(),
            hits.first().map(|h| h.score)
        );

        Ok(hits)
    }

    pub fn document_count(&self) -> usize {
        self.store.len()
    }
}

/// Join hit contents into the grounding context handed to an agent.
pub fn format_context(hits: &[QueryHit]) -> String {
    hits.iter()
        .map(|hit| hit.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
