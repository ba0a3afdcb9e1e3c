//! Precheck Embedding Layer
//!
//! The embedding capability used by the extractor's relevance selector:
//! a text-to-vector trait, the deterministic in-process implementations,
//! and the all-MiniLM-L6-v2 sentence-transformer on ONNX Runtime (feature
//! `onnx-embeddings`). Models hold no per-call state and are shared behind
//! an `Arc`.

#![warn(missing_docs)]

pub mod embedding;
pub mod onnx;

use std::sync::Arc;

pub use embedding::{
    cosine_similarity, EmbeddingError, EmbeddingModel, MockEmbeddingModel, TokenHashEmbedder,
};
pub use onnx::MINILM_DIMENSION;
#[cfg(feature = "onnx-embeddings")]
pub use onnx::OnnxEmbedder;

/// An embedding model chosen at runtime
pub type SharedEmbedder = Arc<dyn EmbeddingModel + Send + Sync>;
