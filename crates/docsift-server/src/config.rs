//! Configuration file parsing for the server.
//!
//! Loads the bind address, normalization mode, backend selection and
//! pipeline settings from TOML.

use docsift_extractor::ExtractorConfig;
use docsift_llm::BackendConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A setting is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
///
/// ```toml
/// bind_address = "127.0.0.1"
/// bind_port = 5001
/// mock_normalization = false
///
/// [backend]
/// provider = "gemini"
/// model = "gemini-2.5-flash"
///
/// [extractor]
/// retry_limit = 2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 5001)
    pub bind_port: u16,

    /// Replace every document with the built-in sample markdown
    #[serde(default)]
    pub mock_normalization: bool,

    /// Extraction backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Pipeline settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address cannot be empty".to_string()));
        }
        self.backend
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.extractor.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Local configuration: Ollama on its default port
    pub fn default_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 5001,
            mock_normalization: false,
            backend: BackendConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }

    /// Create a default configuration for testing (mock backend)
    pub fn default_test_config() -> Self {
        ServerConfig {
            backend: BackendConfig::Mock {
                response: "{}".to_string(),
            },
            ..Self::default_config()
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
