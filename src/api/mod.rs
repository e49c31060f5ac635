//! API handlers proxied to the backend.
//!
//! # Data Flow
//! ```text
//! request
//!     → Caller extractor (session → Identity, request id)
//!     → handler (action dispatch, uid injection, shape conversion)
//!     → proxy::Upstream
//!     → proxy::Fallback
//!     → caller
//! ```

pub mod auth;
pub mod health;
pub mod menu;
pub mod store;
pub mod tables;

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ConsoleError;
use crate::http::request::RequestId;
use crate::http::server::AppState;
use crate::proxy::Caller;

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();
        let identity = state.identity(&parts.headers).unwrap_or_default();
        Ok(Caller {
            identity,
            request_id,
        })
    }
}

/// Query parameters shared by the API routes. Absent values are empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionQuery {
    pub action: String,
    pub category_id: String,
    pub item_id: String,
    pub table_number: String,
    pub uid: String,
}

pub(crate) fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("multipart/form-data"))
}

/// Read a JSON body. An empty or unparseable body is `None`.
pub(crate) async fn json_body(body: Body, limit: usize) -> Result<Option<Value>, ConsoleError> {
    let bytes = axum::body::to_bytes(body, limit).await?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_slice(&bytes).ok())
}

/// Merge `uid` into an object body. Other bodies are returned unchanged.
pub(crate) fn with_uid(mut body: Value, uid: Option<&str>) -> Value {
    if let (Some(obj), Some(uid)) = (body.as_object_mut(), uid) {
        obj.insert("uid".to_string(), Value::String(uid.to_string()));
    }
    body
}

/// The body as an object, or `{}`.
pub(crate) fn object_or_empty(body: Option<Value>) -> Value {
    match body {
        Some(Value::Object(obj)) => Value::Object(obj),
        _ => Value::Object(Map::new()),
    }
}
