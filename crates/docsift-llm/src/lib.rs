//! docsift LLM Provider Layer
//!
//! Extraction backend implementations for the `ExtractionBackend` trait from
//! `docsift-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `GeminiProvider`: Google Generative Language API
//! - `AnyProvider`: One of the above, chosen from `BackendConfig`
//!
//! Providers make exactly one HTTP request per call. Retrying is the
//! executor's job, so a retry budget is never multiplied here.
//!
//! # Examples
//!
//! ```
//! use docsift_llm::MockProvider;
//! use docsift_domain::ExtractionBackend;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let provider = MockProvider::new(r#"{"total": 1}"#);
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, r#"{"total": 1}"#);
//! # });
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod ollama;
pub mod provider;

use async_trait::async_trait;
use docsift_domain::ExtractionBackend;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use provider::{AnyProvider, BackendConfig};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Credentials rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Provider misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Communication(format!("Request timed out: {}", e))
        } else if e.is_decode() {
            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}

/// Map a non-success HTTP status to an error
pub(crate) fn status_error(status: reqwest::StatusCode, body: String, model: &str) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::Authentication(format!("HTTP {}: {}", status, body)),
        404 => LlmError::ModelNotAvailable(model.to_string()),
        429 => LlmError::RateLimitExceeded,
        _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
    Delayed(Duration, String),
}

/// Mock LLM provider for deterministic testing
///
/// Replies are chosen in this order: the first marker rule whose marker
/// occurs in the prompt, then the next queued reply, then the default
/// response. Every prompt is recorded.
///
/// # Examples
///
/// ```
/// use docsift_llm::MockProvider;
/// use docsift_domain::ExtractionBackend;
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let mut provider = MockProvider::new("{}");
/// provider.add_response("extract header", r#"{"invoice_number": "INV-001"}"#);
/// provider.push_response("not json");
///
/// assert_eq!(provider.generate("... extract header ...").await.unwrap(), r#"{"invoice_number": "INV-001"}"#);
/// assert_eq!(provider.generate("other").await.unwrap(), "not json");
/// assert_eq!(provider.generate("other").await.unwrap(), "{}");
/// assert_eq!(provider.call_count(), 3);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` whenever the prompt contains `marker`
    pub fn add_response(&mut self, marker: impl Into<String>, response: impl Into<String>) {
        lock(&self.rules).push((marker.into(), MockReply::Text(response.into())));
    }

    /// Fail whenever the prompt contains `marker`
    pub fn add_error(&mut self, marker: impl Into<String>) {
        lock(&self.rules).push((marker.into(), MockReply::Error("Mock error".to_string())));
    }

    /// Reply after `delay` whenever the prompt contains `marker`
    pub fn add_delayed_response(
        &mut self,
        marker: impl Into<String>,
        delay: Duration,
        response: impl Into<String>,
    ) {
        lock(&self.rules).push((marker.into(), MockReply::Delayed(delay, response.into())));
    }

    /// Queue a one-shot response
    pub fn push_response(&mut self, response: impl Into<String>) {
        lock(&self.queue).push_back(MockReply::Text(response.into()));
    }

    /// Queue a one-shot failure
    pub fn push_error(&mut self, message: impl Into<String>) {
        lock(&self.queue).push_back(MockReply::Error(message.into()));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Reset the call count and recorded prompts
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    fn next_reply(&self, prompt: &str) -> MockReply {
        if let Some((_, reply)) = lock(&self.rules)
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
        {
            return reply.clone();
        }
        lock(&self.queue)
            .pop_front()
            .unwrap_or_else(|| MockReply::Text(self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ExtractionBackend for MockProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.to_string());

        match self.next_reply(prompt) {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(message) => Err(LlmError::Other(message)),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt").await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_marker_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("say hello please").await.unwrap(), "world");
        assert_eq!(provider.generate("foo").await.unwrap(), "bar");
        assert_eq!(provider.generate("unknown").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_mock_provider_queue_is_consumed_in_order() {
        let mut provider = MockProvider::new("fallback");
        provider.push_response("first");
        provider.push_error("boom");
        provider.push_response("third");

        assert_eq!(provider.generate("p").await.unwrap(), "first");
        assert!(matches!(provider.generate("p").await, Err(LlmError::Other(m)) if m == "boom"));
        assert_eq!(provider.generate("p").await.unwrap(), "third");
        assert_eq!(provider.generate("p").await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").await.unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("a bad prompt").await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_mock_provider_structured_uses_generate() {
        let provider = MockProvider::new("structured response");
        let result = provider.generate_structured("prompt", "{}").await;
        assert_eq!(result.unwrap(), "structured response");
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").await.unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_status_mapping() {
        use reqwest::StatusCode;

        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, String::new(), "m"),
            LlmError::ModelNotAvailable(m) if m == "m"
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, String::new(), "m"),
            LlmError::RateLimitExceeded
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new(), "m"),
            LlmError::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "upstream".to_string(), "m"),
            LlmError::Communication(_)
        ));
    }
}
