//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the console.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Placeholder secret shipped in the defaults. Startup warns when it is still in use.
pub const DEFAULT_SESSION_SECRET: &str = "CHANGE_ME_IN_PRODUCTION_CHANGE_ME_IN_PRODUCTION";

/// Root configuration for the console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Backend API the console forwards to.
    pub upstream: UpstreamConfig,

    /// Session token and cookie settings.
    pub session: SessionConfig,

    /// Page guard settings.
    pub guard: GuardConfig,

    /// Retry configuration for read paths.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the backend (e.g., "http://localhost:4000").
    pub base_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Timeout for a single upstream call in seconds.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens.
    pub secret: String,

    /// Name of the cookie carrying the session token.
    pub cookie_name: String,

    /// Session lifetime when the backend does not report `expiresIn`.
    pub default_max_age_secs: u64,

    /// Add the `Secure` attribute to session cookies.
    pub secure_cookie: bool,

    /// Send the backend idToken as `Authorization: Bearer` on proxied calls
    /// instead of `x-user-id`.
    pub forward_id_token_as_bearer: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            secret: DEFAULT_SESSION_SECRET.to_string(),
            cookie_name: "idToken".to_string(),
            default_max_age_secs: 3600,
            secure_cookie: false,
            forward_id_token_as_bearer: false,
        }
    }
}

/// Page guard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Path prefixes that require a session.
    pub protected_prefixes: Vec<String>,

    /// Auth pages a signed-in user is bounced away from.
    pub auth_prefixes: Vec<String>,

    /// Where unauthenticated requests are sent.
    pub login_path: String,

    /// Where authenticated requests to auth pages are sent.
    pub home_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: ["/", "/store", "/tables", "/menu", "/billing"]
                .into_iter()
                .map(String::from)
                .collect(),
            auth_prefixes: vec!["/login".to_string(), "/signup".to_string()],
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries of GET calls after transport errors.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 2,
            base_delay_ms: 100,
            max_delay_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes (covers image uploads).
    pub max_body_size: usize,

    /// Directory with the prebuilt dashboard bundle, served behind the guard.
    pub static_dir: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
            static_dir: None,
        }
    }
}
