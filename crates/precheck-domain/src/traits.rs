//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction core and the
//! services it depends on. Implementations live in other crates.

/// Trait for text-completion providers
///
/// Implemented by the infrastructure layer (precheck-llm). One implementation
/// is chosen at startup; the extraction core never knows which backend is
/// behind it.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for `prompt`, producing at most `max_tokens` tokens
    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, Self::Error>;
}

impl<T: LlmProvider + ?Sized> LlmProvider for std::sync::Arc<T> {
    type Error = T::Error;

    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, Self::Error> {
        (**self).generate(prompt, max_tokens)
    }
}
