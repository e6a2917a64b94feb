//! Trigram embedding provider using character trigram-based content-aware embeddings.

use crate::embeddings::provider::EmbeddingProvider;
use concierge_core::AppResult;
use std::collections::BTreeMap;

/// Words dropped before hashing; they carry no topical signal.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Trigram-based embedding provider for local, offline operation.
///
/// Each remaining word adds weight to one bucket per character trigram plus
/// one bucket for the whole word; the result is scaled to unit length.
/// Texts sharing vocabulary land close together in Euclidean space, which is
/// enough for small corpora and fully deterministic.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();

        // Ordered map keeps the float accumulation order stable between calls
        let mut word_freq: BTreeMap<&str, u32> = BTreeMap::new();
        for word in lower
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let bucket = bucket_for(window.iter().copied(), 37, self.dimensions);
                embedding[bucket] += (*freq as f32).sqrt();
            }

            let bucket = bucket_for(word.chars(), 31, self.dimensions);
            embedding[bucket] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

/// Polynomial rolling hash over UTF-8 bytes, reduced to a bucket index.
fn bucket_for(chars: impl Iterator<Item = char>, multiplier: u64, dimensions: usize) -> usize {
    let mut buf = [0u8; 4];
    let hash = chars.fold(0u64, |acc, c| {
        c.encode_utf8(&mut buf)
            .bytes()
            .fold(acc, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
    });
    (hash % dimensions as u64) as usize
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[tokio::test]
    async fn test_trigram_provider_metadata() {
        let provider = TrigramProvider::new(384);
        assert_eq!(provider.dimensions(), 384);
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
    }

    #[tokio::test]
    async fn test_embed_single_is_unit_length() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("hello world").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let provider = TrigramProvider::new(64);
        let texts = vec![
            "shipping takes days".to_string(),
            "refund policy".to_string(),
        ];

        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed(&texts[0]).await.unwrap());
        assert_eq!(batch[1], provider.embed(&texts[1]).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let provider = TrigramProvider::new(384);
        let embeddings = provider.embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = TrigramProvider::new(384);
        let text = "the same text produces the same vector every time";
        let first = provider.embed(text).await.unwrap();
        let second = provider.embed(text).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_stop_words_only_yields_zero_vector() {
        let provider = TrigramProvider::new(32);
        let embedding = provider.embed("the is at of").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_shared_vocabulary_is_closer() {
        let provider = TrigramProvider::new(384);
        let query = provider.embed("how long for shipping").await.unwrap();
        let shipping = provider.embed("shipping takes 5 days").await.unwrap();
        let refund = provider.embed("refund policy is 30 days").await.unwrap();

        assert!(squared_distance(&query, &shipping) < squared_distance(&query, &refund));
    }

    #[test]
    fn test_punctuation_is_ignored() {
        let provider = TrigramProvider::new(128);
        assert_eq!(
            provider.embed_text("Shipping?"),
            provider.embed_text("shipping")
        );
    }
}
