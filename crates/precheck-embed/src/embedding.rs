//! Embedding models for text vectorization
//!
//! Text-to-vector conversion used to rank document chunks against intent
//! queries. Every model here is deterministic and returns unit-length
//! vectors, so a dot product is a cosine similarity.
//!
//! - **MockEmbeddingModel**: whole-text hash embeddings (tests)
//! - **TokenHashEmbedder**: feature-hashed bag of words (lexical fallback
//!   when no sentence-transformer model is configured)
//! - **OnnxEmbedder**: all-MiniLM-L6-v2 (see [`crate::onnx`])
//!
//! # Examples
//!
//! ```rust
//! use precheck_embed::{EmbeddingModel, TokenHashEmbedder};
//!
//! let model = TokenHashEmbedder::new(384);
//! let embedding = model.embed("The link went down after the upgrade").unwrap();
//! assert_eq!(embedding.len(), 384);
//!
//! // Same text always produces same embedding
//! let embedding2 = model.embed("The link went down after the upgrade").unwrap();
//! assert_eq!(embedding, embedding2);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Model not loaded
    #[error("Embedding model not loaded")]
    ModelNotLoaded,

    /// A model file is missing from the model directory
    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// Model files exist but could not be initialized
    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Vectors of different sizes cannot be compared
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the model advertises
        expected: usize,
        /// Dimension actually produced
        actual: usize,
    },

    /// Model inference error
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
}

/// Trait for embedding models
///
/// Implementations must be deterministic for identical input and return
/// vectors of `dimension()` entries with unit magnitude.
pub trait EmbeddingModel {
    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts at once, preserving order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Get the dimension of embeddings produced by this model
    fn dimension(&self) -> usize;
}

impl<T: EmbeddingModel + ?Sized> EmbeddingModel for std::sync::Arc<T> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

/// Mock embedding model for testing
///
/// Hashes the whole input with one seed per dimension, then normalizes.
/// Different texts get unrelated vectors, so similarity carries no meaning,
/// but the output is deterministic and unit length.
pub struct MockEmbeddingModel {
    dimension: usize,
}

impl MockEmbeddingModel {
    /// Create a new mock embedding model
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| hash_with_seed(text, i as u64))
            .collect();
        normalize(&mut embedding);
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Words too common to say anything about relevance
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "before", "by", "during", "for", "from", "had",
    "has", "have", "how", "if", "in", "is", "it", "of", "on", "or", "should", "that", "the",
    "this", "to", "was", "were", "what", "when", "which", "with",
];

/// Feature-hashed bag-of-words embedder
///
/// Each lower-cased alphanumeric token (stopwords removed) is hashed to a
/// bucket and a sign; bucket weights use sublinear term frequency. Texts
/// sharing vocabulary end up close together, which is enough to rank chunks
/// against intent queries without loading a neural model.
pub struct TokenHashEmbedder {
    dimension: usize,
}

impl TokenHashEmbedder {
    /// Create an embedder producing `dimension`-sized vectors
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .filter(|t| !STOPWORDS.contains(&t.as_str()))
    }
}

impl EmbeddingModel for TokenHashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.dimension == 0 {
            return Err(EmbeddingError::ModelNotLoaded);
        }
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut counts = vec![0.0f32; self.dimension];
        let mut seen_token = false;
        for token in Self::tokens(text) {
            seen_token = true;
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let hash = hasher.finish();
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            counts[bucket] += sign;
        }

        if !seen_token {
            // Punctuation-only input still needs a stable unit vector
            return MockEmbeddingModel::new(self.dimension).embed(text);
        }

        let mut embedding: Vec<f32> = counts
            .into_iter()
            .map(|c| c.signum() * (1.0 + c.abs()).ln())
            .collect();
        normalize(&mut embedding);

        if embedding.iter().all(|v| *v == 0.0) {
            return MockEmbeddingModel::new(self.dimension).embed(text);
        }
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Hash text with a seed to get a deterministic value in [-1, 1]
fn hash_with_seed(text: &str, seed: u64) -> f32 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    seed.hash(&mut hasher);
    let hash_value = hasher.finish();

    let normalized = (hash_value as f64 / u64::MAX as f64) * 2.0 - 1.0;
    normalized as f32
}

/// Scale a vector to unit length in place (zero vectors are left alone)
fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Calculate cosine similarity between two embedding vectors
///
/// Returns a value in [-1, 1]: 1.0 for identical direction, 0.0 for
/// orthogonal vectors, -1.0 for opposite ones.
///
/// # Panics
///
/// Panics if vectors have different lengths
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have same length");

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn magnitude(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_mock_embedding_deterministic() {
        let model = MockEmbeddingModel::new(384);

        let text = "The quick brown fox jumps over the lazy dog";
        let embedding1 = model.embed(text).unwrap();
        let embedding2 = model.embed(text).unwrap();

        assert_eq!(embedding1, embedding2, "Same text should produce same embedding");
    }

    #[test]
    fn test_mock_embedding_normalized() {
        let model = MockEmbeddingModel::new(384);
        let embedding = model.embed("test text").unwrap();
        assert!((magnitude(&embedding) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_mock_embedding_empty_text() {
        let model = MockEmbeddingModel::new(384);
        let result = model.embed("");
        assert!(result.unwrap_err().to_string().contains("Empty text"));
    }

    #[test]
    fn test_token_embedder_dimension_and_norm() {
        let model = TokenHashEmbedder::new(128);
        let embedding = model.embed("Restart the eNB and check the alarm list").unwrap();
        assert_eq!(embedding.len(), 128);
        assert_eq!(model.dimension(), 128);
        assert!((magnitude(&embedding) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_token_embedder_shared_vocabulary_scores_higher() {
        let model = TokenHashEmbedder::new(384);
        let query = model.embed("How was the correction tested or validated?").unwrap();
        let related = model
            .embed("The correction was validated in the lab and tested on three nodes.")
            .unwrap();
        let unrelated = model
            .embed("Customer site visit is scheduled for next quarter in Espoo.")
            .unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_token_embedder_ignores_case_and_punctuation() {
        let model = TokenHashEmbedder::new(256);
        let a = model.embed("Cell setup FAILED!").unwrap();
        let b = model.embed("cell setup failed").unwrap();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_token_embedder_punctuation_only_is_unit_vector() {
        let model = TokenHashEmbedder::new(64);
        let embedding = model.embed("--- ... ---").unwrap();
        assert!((magnitude(&embedding) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_token_embedder_rejects_blank_and_zero_dimension() {
        assert!(TokenHashEmbedder::new(64).embed("   ").is_err());
        assert!(matches!(
            TokenHashEmbedder::new(0).embed("text"),
            Err(EmbeddingError::ModelNotLoaded)
        ));
    }

    #[test]
    fn test_embed_batch_preserves_order() {
        let model = TokenHashEmbedder::new(64);
        let batch = model.embed_batch(&["alpha beta", "gamma delta"]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], model.embed("alpha beta").unwrap());
        assert_eq!(batch[1], model.embed("gamma delta").unwrap());
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let vec = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&vec, &vec) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let vec1 = vec![1.0, 0.0, 0.0];
        let vec2 = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&vec1, &vec2).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let vec1 = vec![1.0, 0.0, 0.0];
        let vec2 = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&vec1, &vec2) + 1.0).abs() < 0.0001);
    }
}
