//! Document retrieval for Concierge.
//!
//! Loads a directory of text documents, embeds them, and answers top-k
//! nearest-neighbour queries that supply grounding context to agents.

pub mod document;
pub mod embeddings;
pub mod retriever;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use document::{Document, DocumentStore};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use retriever::{format_context, QueryHit, Retriever, DEFAULT_TOP_K};
pub use vector_index::{FlatIndex, VectorIndex};

use concierge_core::AppResult;
use std::path::Path;
use std::sync::Arc;

/// Load documents from `dir`, create the configured embedder and build a
/// retriever over them.
///
/// Any failure here is a startup failure: no retriever is returned over a
/// partially built index.
pub async fn build_retriever(
    dir: &Path,
    extensions: &[String],
    embedding: &EmbeddingConfig,
) -> AppResult<Retriever> {
    let store = DocumentStore::load(dir, extensions)?;
    let embedder: Arc<dyn EmbeddingProvider> = create_provider(embedding).await?;
    Retriever::build(store, embedder).await
}
