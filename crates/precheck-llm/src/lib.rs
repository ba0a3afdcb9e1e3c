//! Precheck LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `precheck-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GatewayProvider`: Chat-completions HTTP gateway
//!
//! # Examples
//!
//! ```
//! use precheck_llm::MockProvider;
//! use precheck_domain::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt", 900).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod gateway;

use precheck_domain::LlmProvider as LlmProviderTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gateway::{AuthScheme, GatewayProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credentials rejected by the gateway
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls and
/// records every prompt it receives.
///
/// # Examples
///
/// ```
/// use precheck_llm::MockProvider;
/// use precheck_domain::LlmProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// assert_eq!(provider.generate("prompt1", 10).unwrap(), "response1");
/// assert_eq!(provider.prompts(), vec!["prompt1".to_string()]);
///
/// let failing = MockProvider::failing();
/// assert!(failing.generate("anything", 10).is_err());
/// assert_eq!(failing.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    fail_all: bool,
    responses: Arc<Mutex<HashMap<String, Option<String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    max_tokens_seen: Arc<Mutex<Vec<usize>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            fail_all: false,
            responses: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            max_tokens_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider whose every call fails
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new("")
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), Some(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.responses.lock().unwrap().insert(prompt.into(), None);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// The most recent prompt, if any
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    /// The `max_tokens` budget passed with each call
    pub fn max_tokens_seen(&self) -> Vec<usize> {
        self.max_tokens_seen.lock().unwrap().clone()
    }

    /// Reset the call history
    pub fn reset_call_count(&self) {
        self.prompts.lock().unwrap().clear();
        self.max_tokens_seen.lock().unwrap().clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, Self::Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.max_tokens_seen.lock().unwrap().push(max_tokens);

        if self.fail_all {
            return Err(LlmError::Communication("Mock gateway unreachable".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        match responses.get(prompt) {
            Some(Some(response)) => Ok(response.clone()),
            Some(None) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt", 100);
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello", 1).unwrap(), "world");
        assert_eq!(provider.generate("foo", 1).unwrap(), "bar");
        assert_eq!(provider.generate("unknown", 1).unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_call_history() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1", 900).unwrap();
        provider.generate("prompt2", 450).unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_prompt().as_deref(), Some("prompt2"));
        assert_eq!(provider.max_tokens_seen(), vec![900, 450]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
        assert!(provider.last_prompt().is_none());
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("bad prompt", 1);
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[test]
    fn test_mock_provider_failing() {
        let provider = MockProvider::failing();
        let result = provider.generate("anything", 1);
        assert!(matches!(result.unwrap_err(), LlmError::Communication(_)));
    }

    #[test]
    fn test_mock_provider_clone_shares_history() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test", 1).unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
