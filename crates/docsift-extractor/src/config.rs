//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Additional backend attempts after the first failed one
    pub retry_limit: u32,

    /// Maximum time for a single backend attempt (seconds)
    pub attempt_timeout_secs: u64,

    /// Maximum time for a whole request, all tasks included (seconds)
    pub request_timeout_secs: u64,

    /// Maximum normalized document length (characters)
    pub max_document_chars: usize,

    /// Pass each contract's JSON schema to the backend
    pub structured_output: bool,

    /// Fixed text prepended to every extraction instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_preamble: Option<String>,
}

impl ExtractorConfig {
    /// Get the per-attempt timeout as a Duration
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Get the request deadline as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Upper bound on backend calls for one task
    pub fn max_attempts(&self) -> u32 {
        self.retry_limit.saturating_add(1)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.attempt_timeout_secs == 0 {
            return Err("attempt_timeout_secs must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.attempt_timeout_secs > self.request_timeout_secs {
            return Err("attempt_timeout_secs cannot exceed request_timeout_secs".to_string());
        }
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        if self.retry_limit > 10 {
            return Err("retry_limit cannot exceed 10".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            retry_limit: 2,
            attempt_timeout_secs: 120,
            request_timeout_secs: 600,
            max_document_chars: 200_000,
            structured_output: true,
            instruction_preamble: None,
        }
    }
}
