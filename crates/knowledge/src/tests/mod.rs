//! Retrieval behaviour tests.


use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use concierge_core::{AppError, AppResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// Trigram embedder that can be switched into a failing state.
#[derive(Debug)]
pub(crate) struct ToggleProvider {
    inner: TrigramProvider,
    failing: AtomicBool,
}

impl ToggleProvider {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self {
            inner: TrigramProvider::new(dimensions),
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for ToggleProvider {
    fn provider_name(&self) -> &str {
        "toggle"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Embedding("model unavailable".to_string()));
        }
        self.inner.embed_batch(texts).await
    }
}

/// Embedder that drops the first vector of every batch.
#[derive(Debug)]
pub(crate) struct ShortBatchProvider;

#[async_trait::async_trait]
impl EmbeddingProvider for ShortBatchProvider {
    fn provider_name(&self) -> &str {
        "short"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        2
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![0.0, 0.0]).collect())
    }
}

/// Embedder whose single-text vectors are shorter than its batch vectors.
#[derive(Debug)]
pub(crate) struct InconsistentProvider;

#[async_trait::async_trait]
impl EmbeddingProvider for InconsistentProvider {
    fn provider_name(&self) -> &str {
        "inconsistent"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        4
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let dim = if texts.len() == 1 { 2 } else { 4 };
        Ok(texts.iter().map(|_| vec![1.0; dim]).collect())
    }
}
