//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the
//! collaborators it does not own. Implementations live in other crates.

use crate::document::Document;
use async_trait::async_trait;

/// Trait for the extraction backend (an LLM or a stand-in)
///
/// Implemented by the infrastructure layer (docsift-llm). Implementations
/// must be safe to share between concurrent requests: the pipeline holds one
/// instance behind an `Arc` and never mutates it.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Error type for backend calls
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Short provider name (e.g. "ollama")
    fn name(&self) -> &str;

    /// Model identifier used for generation
    fn model(&self) -> &str;

    /// Generate a free-form completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate with a JSON schema constraint on the output (if supported)
    ///
    /// Backends without schema support fall back to plain generation.
    async fn generate_structured(
        &self,
        prompt: &str,
        _json_schema: &str,
    ) -> Result<String, Self::Error> {
        self.generate(prompt).await
    }
}

/// Trait for turning a raw document into text the backend can read
///
/// Normalization (OCR, format conversion) is an upstream capability; the
/// pipeline only invokes it once per request, before any task runs.
pub trait DocumentNormalizer: Send + Sync {
    /// Error type for normalization failures
    type Error: std::fmt::Display;

    /// Produce normalized text for the document
    fn normalize(&self, document: &Document) -> Result<String, Self::Error>;
}
