//! Error types for the Extractor

use precheck_embed::EmbeddingError;
use thiserror::Error;

/// Errors that can occur inside the extraction pipeline
///
/// None of these escape `Extractor::extract`: each one is recovered where it
/// occurs and logged.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding model error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Every chunk was discarded by the noise filter
    #[error("No chunks left after filtering")]
    NoChunks,

    /// Section markers present but the sections could not be isolated
    #[error("Template parse error: {0}")]
    TemplateParse(String),

    /// Background task failed to complete
    #[error("Task error: {0}")]
    Task(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<EmbeddingError> for ExtractorError {
    fn from(e: EmbeddingError) -> Self {
        ExtractorError::Embedding(e.to_string())
    }
}
