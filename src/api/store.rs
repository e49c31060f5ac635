//! `/api/store`: shop profile and credentials.
//!
//! Multipart saves and the logo image are relayed byte for byte; everything
//! else is JSON, with the session uid overriding any `uid` in the body. No
//! fallback substitution on this route.

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};

use crate::api::{is_multipart, json_body, object_or_empty, with_uid, ActionQuery};
use crate::error::ConsoleError;
use crate::http::server::AppState;
use crate::proxy::{Caller, Fallback};
use crate::session::Identity;

const ROUTE: &str = "/api/store";

/// `POST ?action=save` (JSON or multipart) and `POST ?action=updateAuthen`.
pub async fn submit(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ActionQuery>,
    request: Request,
) -> Result<Response, ConsoleError> {
    let inner = state.load();
    let limit = inner.config.security.max_body_size;

    let target = match query.action.as_str() {
        "save" => "save",
        "updateAuthen" => "updateAuthen",
        _ => return Err(ConsoleError::UnknownAction),
    };
    let url = inner.upstream.url(&["api", "store", target], &[]);

    if target == "save" && is_multipart(request.headers()) {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit).await?;
        tracing::debug!(request_id = %caller.request_id, bytes = body.len(), "Relaying store form");
        let reply = inner
            .upstream
            .send_raw(Method::POST, url, &caller, &parts.headers, body)
            .await?;
        return Ok(reply.into_response());
    }

    let body = with_uid(
        object_or_empty(json_body(request.into_body(), limit).await?),
        caller.identity.uid.as_deref(),
    );
    let result = inner.upstream.send_json(Method::POST, url, &caller, Some(&body)).await;
    Ok(Fallback::Relay.settle(ROUTE, result)?.into_response())
}

/// `GET ?action=profile|user|shop|logo`.
pub async fn fetch(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ActionQuery>,
) -> Result<Response, ConsoleError> {
    let uid = owner_uid(&caller.identity, &query.uid).ok_or(ConsoleError::MissingUid)?;
    let inner = state.load();

    let uid = uid.as_str();
    let upstream = &inner.upstream;
    let url = match query.action.as_str() {
        "profile" => upstream.url(&["api", "store", "profile", uid], &[]),
        "user" => upstream.url(&["api", "users", uid], &[]),
        "shop" => upstream.url(&["api", "shop", uid], &[]),
        "logo" => upstream.url(&["api", "store", "logo", uid], &[]),
        _ => return Err(ConsoleError::UnknownAction),
    };

    if query.action == "logo" {
        let reply = inner
            .upstream
            .send_raw(Method::GET, url, &caller, &HeaderMap::new(), Bytes::new())
            .await?;
        return Ok(reply.into_response());
    }

    let result = inner.upstream.send_json(Method::GET, url, &caller, None).await;
    Ok(Fallback::Relay.settle(ROUTE, result)?.into_response())
}

/// Whose store to read: the session's uid, then its email. The `uid` query
/// parameter is only honored without a session.
fn owner_uid(identity: &Identity, query_uid: &str) -> Option<String> {
    if identity.is_authenticated() {
        return identity.uid.clone().or_else(|| identity.email.clone());
    }
    Some(query_uid.to_string()).filter(|uid| !uid.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(uid: Option<&str>, email: Option<&str>) -> Identity {
        Identity {
            uid: uid.map(str::to_string),
            email: email.map(str::to_string),
            session: Some(("jti".to_string(), u64::MAX)),
            ..Default::default()
        }
    }

    #[test]
    fn test_session_uid_wins_over_query() {
        let identity = signed_in(Some("u1"), Some("a@b.c"));
        assert_eq!(owner_uid(&identity, "someone-else").as_deref(), Some("u1"));
    }

    #[test]
    fn test_email_when_no_uid() {
        let identity = signed_in(None, Some("a@b.c"));
        assert_eq!(owner_uid(&identity, "").as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_query_uid_without_session() {
        assert_eq!(owner_uid(&Identity::anonymous(), "u9").as_deref(), Some("u9"));
        assert_eq!(owner_uid(&Identity::anonymous(), ""), None);
    }
}
