//! `/api/tables`: seating records.

use axum::{
    extract::{Query, Request, State},
    http::Method,
};
use serde_json::{json, Value};

use crate::api::{json_body, with_uid, ActionQuery};
use crate::error::ConsoleError;
use crate::http::server::AppState;
use crate::proxy::{Caller, Fallback, UpstreamReply};

const ROUTE: &str = "/api/tables";

pub async fn list(State(state): State<AppState>, caller: Caller) -> Result<UpstreamReply, ConsoleError> {
    let inner = state.load();
    let uid = caller.identity.uid.clone().unwrap_or_default();
    let url = inner.upstream.url(&["api", "tables"], &[("uid", uid.as_str())]);

    let result = inner.upstream.send_json(Method::GET, url, &caller, None).await;
    Fallback::Read.settle(ROUTE, result)
}

/// `?action=bulk` with `{count}` or `?action=single` with `{tableNumber}`.
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ActionQuery>,
    request: Request,
) -> Result<UpstreamReply, ConsoleError> {
    let inner = state.load();
    let body = json_body(request.into_body(), inner.config.security.max_body_size).await?;

    let (segment, field) = match query.action.as_str() {
        "bulk" => ("bulk", "count"),
        "single" => ("single", "tableNumber"),
        _ => return Err(ConsoleError::UnknownAction),
    };

    let mut body = match body {
        Some(body @ Value::Object(_)) => body,
        _ => json!({}),
    };
    if body.get(field).and_then(positive_integer).is_none() {
        return Err(ConsoleError::BadRequest(format!(
            "{} must be a positive integer",
            field
        )));
    }
    body = with_uid(body, caller.identity.uid.as_deref());

    let url = inner.upstream.url(&["api", "tables", segment], &[]);
    let result = inner.upstream.send_json(Method::POST, url, &caller, Some(&body)).await;
    Fallback::Write.settle(ROUTE, result)
}

/// `?tableNumber=N`.
pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ActionQuery>,
) -> Result<UpstreamReply, ConsoleError> {
    if query.table_number.is_empty() {
        return Err(ConsoleError::BadRequest("tableNumber is required".to_string()));
    }
    let number = parse_positive(&query.table_number).ok_or_else(|| {
        ConsoleError::BadRequest("tableNumber must be a positive integer".to_string())
    })?;

    let inner = state.load();
    let uid = caller.identity.uid.clone().unwrap_or_default();
    let number = number.to_string();
    let url = inner
        .upstream
        .url(&["api", "tables", number.as_str()], &[("uid", uid.as_str())]);

    let result = inner.upstream.send_json(Method::DELETE, url, &caller, None).await;
    Fallback::Write.settle(ROUTE, result)
}

fn parse_positive(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok().filter(|n| *n > 0)
}

/// A positive integer given as a JSON number or a digit string.
fn positive_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().filter(|n| *n > 0),
        Value::String(s) => parse_positive(s),
        _ => None,
    }
}
