//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use docsift_extractor::ExtractorConfig;
use docsift_llm::BackendConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Extraction backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Pipeline settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl Config {
    /// Load configuration from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let contents = fs::read_to_string(path)?;
                toml::from_str::<Config>(&contents)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate both sections.
    pub fn validate(&self) -> Result<()> {
        self.backend
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        self.extractor.validate().map_err(CliError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::load(None).unwrap();
        assert!(matches!(config.backend, BackendConfig::Ollama { .. }));
        assert_eq!(config.extractor.retry_limit, 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nprovider = \"mock\"\nresponse = \"{{}}\"\n\n[extractor]\nretry_limit = 0"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(matches!(config.backend, BackendConfig::Mock { .. }));
        assert_eq!(config.extractor.retry_limit, 0);
    }

    #[test]
    fn test_invalid_extractor_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extractor]\nmax_document_chars = 0").unwrap();

        let result = Config::load(Some(file.path()));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
