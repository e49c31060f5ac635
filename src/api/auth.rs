//! `POST /api/auth?action=…` and `POST /api/auth/{action}`.
//!
//! Login mints the console's own session token from the backend's reply and
//! sets it as an HttpOnly cookie. Backend auth calls carry no identity.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::api::{object_or_empty, ActionQuery};
use crate::error::ConsoleError;
use crate::http::server::{AppState, ConsoleInner};
use crate::observability::metrics;
use crate::proxy::{Caller, Fallback};
use crate::session::{cookies, Identity, SessionClaims};

const DEFAULT_SHOP_NAME: &str = "Store Owner";

pub async fn dispatch_query(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ActionQuery>,
    body: Bytes,
) -> Result<Response, ConsoleError> {
    dispatch(&state, caller, &query.action, &body).await
}

pub async fn dispatch_path(
    State(state): State<AppState>,
    caller: Caller,
    Path(action): Path<String>,
    body: Bytes,
) -> Result<Response, ConsoleError> {
    dispatch(&state, caller, &action, &body).await
}

async fn dispatch(
    state: &AppState,
    caller: Caller,
    action: &str,
    body: &[u8],
) -> Result<Response, ConsoleError> {
    let body: Option<Value> = serde_json::from_slice(body).ok();
    let inner = state.load();

    match action {
        "register" => forward(&inner, &caller, "register", &object_or_empty(body)).await,
        "login" => login(&inner, &caller, object_or_empty(body)).await,
        "logout" => Ok(logout(state, &inner, caller)),
        "verify" => {
            let mut payload = Map::new();
            let id_token = body
                .as_ref()
                .and_then(|b| b.get("idToken"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| caller.identity.id_token.clone());
            if let Some(token) = id_token {
                payload.insert("idToken".to_string(), Value::String(token));
            }
            forward(&inner, &caller, "verify", &Value::Object(payload)).await
        }
        _ => Err(ConsoleError::UnknownAction),
    }
}

/// The caller stripped to its request id.
fn anonymous(caller: &Caller) -> Caller {
    Caller {
        identity: Identity::anonymous(),
        request_id: caller.request_id.clone(),
    }
}

async fn forward(
    inner: &ConsoleInner,
    caller: &Caller,
    action: &str,
    body: &Value,
) -> Result<Response, ConsoleError> {
    let url = inner.upstream.url(&["api", "auth", action], &[]);
    let result = inner
        .upstream
        .send_json(Method::POST, url, &anonymous(caller), Some(body))
        .await;
    Ok(Fallback::Relay.settle("/api/auth", result)?.into_response())
}

async fn login(inner: &ConsoleInner, caller: &Caller, body: Value) -> Result<Response, ConsoleError> {
    let url = inner.upstream.url(&["api", "auth", "login"], &[]);
    let reply = inner
        .upstream
        .send_json(Method::POST, url, &anonymous(caller), Some(&body))
        .await?;
    if !reply.status.is_success() {
        tracing::info!(request_id = %caller.request_id, status = %reply.status, "Login rejected by backend");
        return Ok(reply.into_response());
    }

    let data = &reply.body;
    let uid = str_field(data, "uid")
        .or_else(|| str_field(data, "localId"))
        .ok_or(ConsoleError::LoginRejected("missing_uid"))?;
    let session = &inner.config.session;
    let max_age = data
        .get("expiresIn")
        .and_then(expires_in)
        .unwrap_or(session.default_max_age_secs);
    let id_token = str_field(data, "idToken");

    let mut claims = SessionClaims::new(uid.clone(), max_age);
    claims.uid = Some(uid.clone());
    claims.email = str_field(data, "email").or_else(|| str_field(&body, "email"));
    claims.name = Some(str_field(data, "shopName").unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string()));
    if session.forward_id_token_as_bearer {
        claims.access_token = id_token.clone();
    }
    claims.id_token = id_token;

    let token = inner.keys.issue(&claims)?;
    let cookie = cookies::issue(&session.cookie_name, &token, max_age, session.secure_cookie)
        .ok_or_else(|| ConsoleError::Setup("session cookie is not a valid header".to_string()))?;

    metrics::record_session("issued");
    tracing::info!(request_id = %caller.request_id, uid = %uid, max_age, "Session issued");

    Ok(([(header::SET_COOKIE, cookie)], Json(json!({ "ok": true }))).into_response())
}

fn logout(state: &AppState, inner: &ConsoleInner, caller: Caller) -> Response {
    if let Some((jti, exp)) = &caller.identity.session {
        state.revoked.revoke(jti, *exp);
        metrics::record_session("revoked");
        tracing::info!(request_id = %caller.request_id, "Session revoked");
    }

    let url = inner.upstream.url(&["api", "auth", "logout"], &[]);
    inner.upstream.notify(url, anonymous(&caller));

    let body = Json(json!({ "ok": true }));
    match cookies::clear(&inner.config.session.cookie_name) {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], body).into_response(),
        None => body.into_response(),
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `expiresIn` as seconds: a digit string or a non-negative number.
fn expires_in(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        _ => None,
    }
}
