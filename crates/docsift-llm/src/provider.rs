//! Configuration-selected backend

use crate::{gemini, ollama, GeminiProvider, LlmError, MockProvider, OllamaProvider};
use async_trait::async_trait;
use docsift_domain::ExtractionBackend;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Backend selection, the `[backend]` table of a config file
///
/// ```toml
/// [backend]
/// provider = "ollama"
/// endpoint = "http://localhost:11434"
/// model = "llama3.1"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Deterministic mock returning a fixed response
    Mock {
        /// Response returned for every prompt
        #[serde(default = "default_mock_response")]
        response: String,
    },

    /// Local Ollama server
    Ollama {
        /// API endpoint
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
        /// Model name
        #[serde(default = "default_ollama_model")]
        model: String,
        /// HTTP timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// Google Gemini
    Gemini {
        /// API endpoint
        #[serde(default = "default_gemini_endpoint")]
        endpoint: String,
        /// Model name
        #[serde(default = "default_gemini_model")]
        model: String,
        /// Environment variable holding the API key
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
        /// HTTP timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_mock_response() -> String {
    "{}".to_string()
}

fn default_ollama_endpoint() -> String {
    ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

fn default_gemini_endpoint() -> String {
    gemini::DEFAULT_ENDPOINT.to_string()
}

fn default_gemini_model() -> String {
    gemini::DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    ollama::DEFAULT_TIMEOUT_SECS
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Ollama {
            endpoint: default_ollama_endpoint(),
            model: default_ollama_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Check the settings without contacting the backend
    pub fn validate(&self) -> Result<(), LlmError> {
        match self {
            BackendConfig::Mock { .. } => Ok(()),
            BackendConfig::Ollama {
                endpoint,
                model,
                timeout_secs,
            } => check_common(endpoint, model, *timeout_secs),
            BackendConfig::Gemini {
                endpoint,
                model,
                api_key_env,
                timeout_secs,
            } => {
                if api_key_env.trim().is_empty() {
                    return Err(LlmError::Config("api_key_env cannot be empty".to_string()));
                }
                check_common(endpoint, model, *timeout_secs)
            }
        }
    }
}

fn check_common(endpoint: &str, model: &str, timeout_secs: u64) -> Result<(), LlmError> {
    if endpoint.trim().is_empty() {
        return Err(LlmError::Config("endpoint cannot be empty".to_string()));
    }
    if model.trim().is_empty() {
        return Err(LlmError::Config("model cannot be empty".to_string()));
    }
    if timeout_secs == 0 {
        return Err(LlmError::Config("timeout_secs must be > 0".to_string()));
    }
    Ok(())
}

/// Any of the bundled backends
#[derive(Debug, Clone)]
pub enum AnyProvider {
    /// Mock backend
    Mock(MockProvider),
    /// Ollama backend
    Ollama(OllamaProvider),
    /// Gemini backend
    Gemini(GeminiProvider),
}

impl AnyProvider {
    /// Build the backend described by `config`
    ///
    /// For Gemini the API key is read from the configured environment
    /// variable; a missing key is a configuration error.
    pub fn from_config(config: &BackendConfig) -> Result<Self, LlmError> {
        config.validate()?;

        let provider = match config {
            BackendConfig::Mock { response } => AnyProvider::Mock(MockProvider::new(response.clone())),
            BackendConfig::Ollama {
                endpoint,
                model,
                timeout_secs,
            } => AnyProvider::Ollama(OllamaProvider::with_timeout(
                endpoint.clone(),
                model.clone(),
                Duration::from_secs(*timeout_secs),
            )?),
            BackendConfig::Gemini {
                endpoint,
                model,
                api_key_env,
                timeout_secs,
            } => {
                let api_key = std::env::var(api_key_env).map_err(|_| {
                    LlmError::Config(format!("Environment variable {} is not set", api_key_env))
                })?;
                AnyProvider::Gemini(GeminiProvider::with_endpoint(
                    endpoint.clone(),
                    model.clone(),
                    api_key,
                    Duration::from_secs(*timeout_secs),
                )?)
            }
        };

        info!(backend = provider.name(), model = provider.model(), "Backend configured");
        Ok(provider)
    }
}

impl From<MockProvider> for AnyProvider {
    fn from(provider: MockProvider) -> Self {
        AnyProvider::Mock(provider)
    }
}

#[async_trait]
impl ExtractionBackend for AnyProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        match self {
            AnyProvider::Mock(p) => p.name(),
            AnyProvider::Ollama(p) => p.name(),
            AnyProvider::Gemini(p) => p.name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            AnyProvider::Mock(p) => p.model(),
            AnyProvider::Ollama(p) => p.model(),
            AnyProvider::Gemini(p) => p.model(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            AnyProvider::Mock(p) => p.generate(prompt).await,
            AnyProvider::Ollama(p) => p.generate(prompt).await,
            AnyProvider::Gemini(p) => p.generate(prompt).await,
        }
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        json_schema: &str,
    ) -> Result<String, Self::Error> {
        match self {
            AnyProvider::Mock(p) => p.generate_structured(prompt, json_schema).await,
            AnyProvider::Ollama(p) => p.generate_structured(prompt, json_schema).await,
            AnyProvider::Gemini(p) => p.generate_structured(prompt, json_schema).await,
        }
    }
}
