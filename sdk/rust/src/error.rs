use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_MESSAGE: &str = "Something went wrong, please try again";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The console answered with a non-success status.
    #[error("{message} (status {status})")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
        payload: Option<Value>,
    },

    /// Rejected before sending.
    #[error("{0}")]
    Validation(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid reply: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn from_reply(status: u16, payload: Option<Value>) -> Self {
        let (message, code) = match &payload {
            Some(p) => (pick_message(p), pick_code(p)),
            None => (DEFAULT_MESSAGE.to_string(), None),
        };
        ClientError::Http {
            status,
            code,
            message,
            payload,
        }
    }

    /// HTTP status, when the console answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Validation(_) => Some(400),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// `{detail:{error:{message}}}`, the raw identity provider error.
fn provider_error(payload: &Value) -> Option<&str> {
    payload
        .get("detail")?
        .get("error")?
        .get("message")?
        .as_str()
}

/// The human-readable message in an error payload.
pub fn pick_message(payload: &Value) -> String {
    if let Some(text) = payload.as_str() {
        return text.to_string();
    }
    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    if payload.get("error").is_some_and(Value::is_string) {
        return DEFAULT_MESSAGE.to_string();
    }
    provider_error(payload)
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string())
}

/// The machine-readable code in an error payload, e.g. `EMAIL_EXISTS`.
pub fn pick_code(payload: &Value) -> Option<String> {
    if let Some(code) = payload.get("error").and_then(Value::as_str) {
        return Some(code.to_string());
    }
    provider_error(payload).map(str::to_string)
}
