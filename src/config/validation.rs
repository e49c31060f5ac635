//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! reported at once so an operator can fix a file in one pass.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ConsoleConfig;

/// Minimum HMAC secret length in bytes.
const MIN_SECRET_LEN: usize = 32;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ConsoleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.cannot_be_a_base() {
                errors.push(ValidationError::new("upstream.base_url", "must be a base URL"));
            }
        }
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.base_url", e.to_string())),
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.request_timeout_secs", "must be > 0"));
    }

    if config.session.secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::new(
            "session.secret",
            format!("must be at least {} bytes", MIN_SECRET_LEN),
        ));
    }

    let cookie = &config.session.cookie_name;
    if cookie.is_empty() || !cookie.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        errors.push(ValidationError::new(
            "session.cookie_name",
            "must be non-empty and contain only [A-Za-z0-9_-]",
        ));
    }

    if config.session.default_max_age_secs == 0 {
        errors.push(ValidationError::new("session.default_max_age_secs", "must be > 0"));
    }

    for path in config
        .guard
        .protected_prefixes
        .iter()
        .chain(config.guard.auth_prefixes.iter())
        .chain([&config.guard.login_path, &config.guard.home_path])
    {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(
                "guard",
                format!("path '{}' must start with '/'", path),
            ));
        }
    }

    if config.retries.enabled && config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be >= 1"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "is not a socket address",
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ConsoleConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ConsoleConfig::default();
        config.upstream.base_url = "ftp://backend".into();
        config.session.secret = "short".into();
        config.session.cookie_name = "bad name;".into();
        config.guard.login_path = "login".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"upstream.base_url"));
        assert!(fields.contains(&"session.secret"));
        assert!(fields.contains(&"session.cookie_name"));
        assert!(fields.contains(&"guard"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let mut config = ConsoleConfig::default();
        config.upstream.base_url = "not a url".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "upstream.base_url");
    }
}
