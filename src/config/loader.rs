//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ConsoleConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values given on the command line or through the environment.
/// They win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub api_base: Option<String>,
    pub session_secret: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut ConsoleConfig) {
        if let Some(bind) = &self.bind_address {
            config.listener.bind_address = bind.clone();
        }
        if let Some(base) = &self.api_base {
            config.upstream.base_url = base.clone();
        }
        if let Some(secret) = &self.session_secret {
            config.session.secret = secret.clone();
        }
    }
}

/// Parse configuration text without validating it.
pub fn parse_config(content: &str) -> Result<ConsoleConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<ConsoleConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    overrides.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a validated configuration from defaults plus overrides, for runs without a file.
pub fn default_config(overrides: &Overrides) -> Result<ConsoleConfig, ConfigError> {
    let mut config = ConsoleConfig::default();
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_applies_overrides_after_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[upstream]\nbase_url = \"http://from-file:4000\"\n[session]\nsecret = \"{}\"",
            "f".repeat(40)
        )
        .unwrap();

        let overrides = Overrides {
            api_base: Some("http://from-env:4000".into()),
            ..Default::default()
        };
        let config = load_config(file.path(), &overrides).unwrap();

        assert_eq!(config.upstream.base_url, "http://from-env:4000");
        assert_eq!(config.session.secret, "f".repeat(40));
    }

    #[test]
    fn test_validation_error_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nsecret = \"tiny\"").unwrap();

        let err = load_config(file.path(), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("session.secret"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = parse_config("[upstream\nbase_url = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
