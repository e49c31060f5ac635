//! Errors surfaced by request handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::session::SessionError;

/// Client-facing text for a failed backend call; the cause is only logged.
pub const UPSTREAM_MESSAGE: &str = "Backend request failed";

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("{0}")]
    BadRequest(String),

    #[error("missing uid")]
    MissingUid,

    #[error("unknown action")]
    UnknownAction,

    #[error("login rejected: {0}")]
    LoginRejected(&'static str),

    #[error("Backend request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid setup: {0}")]
    Setup(String),
}

impl ConsoleError {
    pub fn status(&self) -> StatusCode {
        match self {
            ConsoleError::BadRequest(_)
            | ConsoleError::MissingUid
            | ConsoleError::Multipart(_)
            | ConsoleError::Body(_) => StatusCode::BAD_REQUEST,
            ConsoleError::UnknownAction => StatusCode::NOT_FOUND,
            ConsoleError::LoginRejected(_) => StatusCode::UNAUTHORIZED,
            ConsoleError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ConsoleError::Session(_) | ConsoleError::Setup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = match &self {
            ConsoleError::UnknownAction => json!({ "error": "unknown_action" }),
            ConsoleError::MissingUid => json!({ "message": "missing uid" }),
            ConsoleError::LoginRejected(code) => json!({ "ok": false, "error": code }),
            ConsoleError::Session(_) | ConsoleError::Setup(_) => {
                json!({ "success": false, "message": "Internal error" })
            }
            ConsoleError::Upstream(_) => json!({ "success": false, "message": UPSTREAM_MESSAGE }),
            other => json!({ "success": false, "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ConsoleError::UnknownAction.status(), StatusCode::NOT_FOUND);
        assert_eq!(ConsoleError::MissingUid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ConsoleError::LoginRejected("missing_uid").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ConsoleError::BadRequest("tableNumber is required".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_upstream_error_hides_cause() {
        let cause = reqwest::Client::new()
            .get("http://backend.internal:4000/api/store/profile/u1")
            .header("x-bad", "line\nbreak")
            .build()
            .unwrap_err();
        let response = ConsoleError::Upstream(cause).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "success": false, "message": UPSTREAM_MESSAGE }));
    }
}
