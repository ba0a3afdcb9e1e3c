//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use precheck_extractor::ExtractorConfig;
use precheck_llm::gateway::{
    DEFAULT_MAX_RETRIES, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
    DEFAULT_TOP_P,
};
use precheck_llm::AuthScheme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration, one table per component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction pipeline tunables
    pub extractor: ExtractorConfig,

    /// Completion gateway settings
    pub llm: LlmSettings,

    /// Embedding model settings
    pub embedding: EmbeddingSettings,
}

/// Completion gateway settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat-completions endpoint URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Workspace header value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,

    /// How the key is presented
    pub auth: AuthScheme,

    /// System message sent ahead of every prompt
    pub system_prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling parameter
    pub top_p: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per request
    pub max_retries: u32,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

/// Embedding model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Directory holding all-MiniLM-L6-v2 as `model.onnx` + `tokenizer.json`.
    /// Without it the lexical token-hash embedder is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<PathBuf>,

    /// Vector dimension of the token-hash embedder
    pub dimension: usize,
}

impl AppConfig {
    /// Load configuration from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path)?;
                Self::from_toml(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every table.
    pub fn validate(&self) -> Result<()> {
        self.extractor.validate()?;
        if self.llm.endpoint.trim().is_empty() {
            return Err(CliError::Config("llm.endpoint must not be empty".into()));
        }
        if self.embedding.dimension == 0 {
            return Err(CliError::Config(
                "embedding.dimension must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}

impl LlmSettings {
    /// Read the API key from the configured environment variable.
    ///
    /// A missing key is not an error: the gateway will reject the call and
    /// the extraction degrades to empty templates.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/chat/completions".to_string(),
            model: "GPT41".to_string(),
            workspace: None,
            auth: AuthScheme::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            api_key_env: "PRECHECK_LLM_API_KEY".to_string(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_dir: None,
            dimension: 384,
        }
    }
}
