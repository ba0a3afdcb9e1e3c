//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for normalization, retrieval and prompting
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Normalized bodies up to this many characters go to the LLM directly;
    /// also the hard bound on text embedded in any prompt
    pub max_direct_context_chars: usize,

    /// Maximum chunk size (characters) when segmenting long bodies
    pub chunk_size_chars: usize,

    /// Chunks kept per intent query
    pub top_k_per_query: usize,

    /// Upper bound on the assembled retrieval context (characters)
    pub max_assembled_context_chars: usize,

    /// Output token budget for each completion call
    pub max_llm_output_tokens: usize,

    /// Chunks shorter than this (after trimming) are discarded as noise
    pub min_chunk_length: usize,

    /// Sequential chunks used when relevance selection yields nothing
    pub fallback_chunk_count: usize,

    /// Sentence splitting is rejected in favour of paragraphs when the
    /// sentences cover less than this fraction of the text
    pub sentence_coverage_ratio: f64,

    /// Header field names dropped by the normalizer (`name:` at line start)
    pub header_fields: Vec<String>,

    /// Lines containing any of these phrases (case-insensitive) are dropped
    pub boilerplate_phrases: Vec<String>,

    /// Lines starting with at least this many dashes are separators
    pub separator_min_dashes: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_direct_context_chars: 9_000,
            chunk_size_chars: 1_200,
            top_k_per_query: 2,
            max_assembled_context_chars: 9_000,
            max_llm_output_tokens: 900,
            min_chunk_length: 30,
            fallback_chunk_count: 6,
            sentence_coverage_ratio: 0.5,
            header_fields: ["from", "to", "cc", "subject", "date", "sent"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            boilerplate_phrases: ["best regards", "thanks", "thank you", "forwarded message"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            separator_min_dashes: 5,
        }
    }
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_direct_context_chars == 0 {
            return Err(config_error("max_direct_context_chars must be greater than 0"));
        }
        if self.chunk_size_chars == 0 {
            return Err(config_error("chunk_size_chars must be greater than 0"));
        }
        if self.max_assembled_context_chars == 0 {
            return Err(config_error("max_assembled_context_chars must be greater than 0"));
        }
        if self.max_llm_output_tokens == 0 {
            return Err(config_error("max_llm_output_tokens must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.sentence_coverage_ratio) {
            return Err(config_error("sentence_coverage_ratio must be within [0, 1]"));
        }
        if self.separator_min_dashes == 0 {
            return Err(config_error("separator_min_dashes must be greater than 0"));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| config_error(&format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExtractorError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            config_error(&format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| config_error(&format!("Failed to serialize to TOML: {}", e)))
    }
}

fn config_error(message: &str) -> ExtractorError {
    ExtractorError::Config(message.to_string())
}
