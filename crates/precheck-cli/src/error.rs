//! Error types for the CLI application.

use precheck_embed::EmbeddingError;
use precheck_extractor::ExtractorError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extractor setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Embedding model could not be loaded
    #[error("Embedding model error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A recognized format that needs a parser this build does not ship
    #[error("Unsupported format for {file}: {reason}")]
    UnsupportedFormat {
        /// File name
        file: String,
        /// What would be needed to read it
        reason: String,
    },

    /// None of the inputs produced any text
    #[error("No valid content extracted")]
    NoContent,
}
