//! Embedding providers.
//!
//! An embedder maps a batch of texts to one fixed-dimension vector per text,
//! in input order. The model behind it is opaque to the rest of the crate.

pub mod provider;
pub mod providers;

pub use concierge_core::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
