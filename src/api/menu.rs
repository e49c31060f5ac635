//! `/api/menu`: categories and items.
//!
//! Reads convert option groups to the dashboard's shape; writes convert them
//! to the backend's. Item writes with an attached image arrive as multipart
//! and are re-encoded field by field.

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::Method,
};
use reqwest::multipart::{Form, Part};

use crate::api::{is_multipart, json_body, with_uid, ActionQuery};
use crate::error::ConsoleError;
use crate::http::server::AppState;
use crate::proxy::{Caller, Fallback, UpstreamReply};
use crate::shape::menu::{
    item_body_for_backend, menu_response_for_ui, sub_categories_field_for_backend, SUB_CATEGORIES,
};

const ROUTE: &str = "/api/menu";

pub async fn list(State(state): State<AppState>, caller: Caller) -> Result<UpstreamReply, ConsoleError> {
    let inner = state.load();
    let uid = caller.identity.uid.clone().unwrap_or_default();
    let url = inner.upstream.url(&["api", "menu"], &[("uid", uid.as_str())]);

    let result = inner.upstream.send_json(Method::GET, url, &caller, None).await;
    let mut reply = Fallback::Read.settle(ROUTE, result)?;
    if reply.status.is_success() {
        reply.body = menu_response_for_ui(reply.body);
    }
    Ok(reply)
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ActionQuery>,
    request: Request,
) -> Result<UpstreamReply, ConsoleError> {
    write(&state, caller, query, Method::POST, request).await
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ActionQuery>,
    request: Request,
) -> Result<UpstreamReply, ConsoleError> {
    write(&state, caller, query, Method::PUT, request).await
}

pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ActionQuery>,
) -> Result<UpstreamReply, ConsoleError> {
    if !targets_existing(&query) {
        return Err(ConsoleError::UnknownAction);
    }
    let inner = state.load();
    let uid = caller.identity.uid.clone().unwrap_or_default();
    let url = inner.upstream.url(&["api", "menu"], &backend_query(&query, &uid));

    let result = inner.upstream.send_json(Method::DELETE, url, &caller, None).await;
    Fallback::Write.settle(ROUTE, result)
}

/// `category` with an id, or `item` with both ids.
fn targets_existing(query: &ActionQuery) -> bool {
    match query.action.as_str() {
        "category" => !query.category_id.is_empty(),
        "item" => !query.category_id.is_empty() && !query.item_id.is_empty(),
        _ => false,
    }
}

fn is_valid_target(method: &Method, query: &ActionQuery) -> bool {
    if *method == Method::POST {
        matches!(query.action.as_str(), "category" | "item")
    } else {
        targets_existing(query)
    }
}

/// Multipart is only honored for item writes that name their category (and item, on update).
fn accepts_multipart(method: &Method, query: &ActionQuery) -> bool {
    query.action == "item"
        && !query.category_id.is_empty()
        && (*method == Method::POST || !query.item_id.is_empty())
}

fn backend_query<'a>(query: &'a ActionQuery, uid: &'a str) -> [(&'static str, &'a str); 4] {
    [
        ("action", query.action.as_str()),
        ("categoryId", query.category_id.as_str()),
        ("itemId", query.item_id.as_str()),
        ("uid", uid),
    ]
}

async fn write(
    state: &AppState,
    caller: Caller,
    query: ActionQuery,
    method: Method,
    request: Request,
) -> Result<UpstreamReply, ConsoleError> {
    let inner = state.load();
    let uid = caller.identity.uid.clone().unwrap_or_default();
    let url = inner.upstream.url(&["api", "menu"], &backend_query(&query, &uid));
    let multipart = is_multipart(request.headers());

    if multipart && accepts_multipart(&method, &query) {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| ConsoleError::BadRequest(e.body_text()))?;
        let form = rebuild_form(multipart, caller.identity.uid.as_deref()).await?;
        tracing::debug!(request_id = %caller.request_id, method = %method, "Forwarding menu item form");

        let result = inner.upstream.send_multipart(method, url, &caller, form).await;
        return Fallback::Write.settle(ROUTE, result);
    }

    // A multipart body that is not an item write is not read as JSON.
    let body = if multipart {
        None
    } else {
        json_body(request.into_body(), inner.config.security.max_body_size).await?
    };

    if !is_valid_target(&method, &query) {
        return Err(ConsoleError::UnknownAction);
    }

    let body = body.map(|mut body| {
        item_body_for_backend(&mut body);
        with_uid(body, caller.identity.uid.as_deref())
    });

    let result = inner.upstream.send_json(method, url, &caller, body.as_ref()).await;
    Fallback::Write.settle(ROUTE, result)
}

/// Copy every field into a fresh form: session uid first, `subCategories`
/// converted to backend shape, client-supplied `uid` dropped when a session uid exists.
async fn rebuild_form(mut multipart: Multipart, uid: Option<&str>) -> Result<Form, ConsoleError> {
    let mut form = Form::new();
    if let Some(uid) = uid {
        form = form.text("uid", uid.to_string());
    }

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "uid" && uid.is_some() {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        match file_name {
            Some(file_name) => {
                let mut part = Part::bytes(data.to_vec()).file_name(file_name);
                if let Some(content_type) = content_type {
                    part = part.mime_str(&content_type).map_err(|_| {
                        ConsoleError::BadRequest(format!("invalid content type for field {}", name))
                    })?;
                }
                form = form.part(name, part);
            }
            None => {
                let text = String::from_utf8_lossy(&data).into_owned();
                let text = if name == SUB_CATEGORIES {
                    sub_categories_field_for_backend(&text)
                } else {
                    text
                };
                form = form.text(name, text);
            }
        }
    }

    Ok(form)
}
