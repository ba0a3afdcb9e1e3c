//! Chat-completions gateway provider
//!
//! Talks to an HTTP gateway exposing a chat-completions endpoint. The gateway
//! is addressed with an API key header plus a workspace header; an
//! OpenAI-compatible router can be used instead by switching the auth scheme
//! to a bearer token.
//!
//! # Examples
//!
//! ```no_run
//! use precheck_llm::GatewayProvider;
//!
//! let provider = GatewayProvider::new(
//!     "https://gateway.example.com/v1.1/Chat/Completions",
//!     "GPT41",
//!     "secret-key",
//! )
//! .with_workspace("precheck-workspace");
//! ```

use crate::LlmError;
use precheck_domain::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for gateway requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts (no retry)
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default system message sent ahead of every prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a senior telecom test engineer.";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default nucleus sampling parameter
pub const DEFAULT_TOP_P: f32 = 0.5;

/// How the API key is presented to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `api-key: <key>` header (plus `workspaceName` when configured)
    #[default]
    ApiKeyHeader,
    /// `Authorization: Bearer <key>`
    Bearer,
}

/// HTTP chat-completions provider
pub struct GatewayProvider {
    endpoint: String,
    model: String,
    api_key: String,
    auth: AuthScheme,
    workspace: Option<String>,
    system_prompt: String,
    temperature: f32,
    top_p: f32,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    top_p: f32,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GatewayProvider {
    /// Create a new gateway provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: full chat-completions URL
    /// - `model`: model identifier understood by the gateway
    /// - `api_key`: credential presented according to the auth scheme
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            auth: AuthScheme::default(),
            workspace: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the workspace header value
    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    /// Set the auth scheme
    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    /// Replace the system message
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Set sampling parameters
    pub fn with_sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Model identifier sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, prompt: &'a str, max_tokens: usize) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            top_p: self.top_p,
            temperature: self.temperature,
            max_tokens,
        }
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json-patch+json");

        let builder = match self.auth {
            AuthScheme::ApiKeyHeader => builder.header("api-key", &self.api_key),
            AuthScheme::Bearer => builder.bearer_auth(&self.api_key),
        };

        match &self.workspace {
            Some(workspace) => builder.header("workspaceName", workspace),
            None => builder,
        }
    }

    /// Generate a completion through the gateway
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The gateway is unreachable or times out
    /// - The credentials are rejected
    /// - The model is unknown to the gateway
    /// - The response body is not a chat-completions payload
    pub async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, LlmError> {
        let body = self.request_body(prompt, max_tokens);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.request().json(&body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = response.text().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to read body: {}", e))
                        })?;
                        return parse_completion(&text);
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    match status {
                        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                            return Err(LlmError::Auth(format!("HTTP {}", status)));
                        }
                        reqwest::StatusCode::NOT_FOUND => {
                            return Err(LlmError::ModelNotAvailable(self.model.clone()));
                        }
                        reqwest::StatusCode::TOO_MANY_REQUESTS => {
                            last_error = Some(LlmError::RateLimitExceeded);
                        }
                        _ => {
                            last_error = Some(LlmError::Communication(format!(
                                "HTTP {}: {}",
                                status, error_text
                            )));
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Gateway attempt {} failed, retrying in {:?}", attempts, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl LlmProviderTrait for GatewayProvider {
    type Error = LlmError;

    /// Blocking wrapper around the async call
    ///
    /// Must be called off the async executor (for example from
    /// `tokio::task::spawn_blocking`), which is how the extractor invokes it.
    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, Self::Error> {
        block_on(GatewayProvider::generate(self, prompt, max_tokens))?
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Drive a future to completion from synchronous code
fn block_on<F: Future>(future: F) -> Result<F::Output, LlmError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(future)),
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
            Ok(runtime.block_on(future))
        }
    }
}

/// Extract the first choice's message content from a response body
fn parse_completion(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?;

    debug!("Gateway returned {} chars", content.len());
    Ok(content.trim().to_string())
}
