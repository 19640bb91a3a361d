//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that replaces the configured endpoint list.
pub const ENDPOINTS_ENV: &str = "INDEXER_ENDPOINTS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
///
/// `INDEXER_ENDPOINTS` (comma-separated) overrides the file's endpoint list.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let config = load_unvalidated(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read and parse a TOML file and apply `INDEXER_ENDPOINTS`, without validating.
///
/// For callers that layer further overrides before validating themselves.
pub fn load_unvalidated(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config = parse_config(&content)?;

    apply_endpoint_override(&mut config, std::env::var(ENDPOINTS_ENV).ok());

    Ok(config)
}

/// Parse TOML without validating.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Replace the endpoint list when the override holds at least one entry.
pub fn apply_endpoint_override(config: &mut ClientConfig, value: Option<String>) {
    let Some(value) = value else { return };
    let endpoints = split_endpoint_list(&value);
    if !endpoints.is_empty() {
        tracing::debug!(count = endpoints.len(), "Endpoint list overridden from environment");
        config.endpoints = endpoints;
    }
}

/// Split "a, b,,c" into ["a", "b", "c"].
pub fn split_endpoint_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
