//! Client for the backend API.
//!
//! # Responsibilities
//! - Build backend URLs from the configured base (path segments encoded)
//! - Attach the caller's identity header and the request id
//! - Send JSON, multipart, or raw bodies
//! - Read replies leniently (unparseable JSON becomes `{}`)

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::{RetryConfig, UpstreamConfig};
use crate::error::ConsoleError;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;
use crate::resilience::backoff::retry_delay;
use crate::session::identity::{X_USER_EMAIL, X_USER_ID};
use crate::session::Identity;

/// Who a backend call is made on behalf of.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub identity: Identity,
    pub request_id: String,
}

/// A backend reply with a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// A backend reply relayed byte for byte.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Headers never copied between hops.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// The backend API at a fixed base URL.
#[derive(Debug, Clone)]
pub struct Upstream {
    base: Url,
    client: reqwest::Client,
    retries: RetryConfig,
}

impl Upstream {
    pub fn new(config: &UpstreamConfig, retries: RetryConfig) -> Result<Self, ConsoleError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ConsoleError::Setup(format!("upstream.base_url: {}", e)))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConsoleError::Setup(format!("http client: {}", e)))?;

        Ok(Self { base, client, retries })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `base + segments + ?query`. Segments are percent-encoded; empty query values are skipped.
    pub fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        let pairs: Vec<_> = query.iter().filter(|(_, v)| !v.is_empty()).collect();
        if !pairs.is_empty() {
            let mut q = url.query_pairs_mut();
            for (k, v) in pairs {
                q.append_pair(k, v);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url, caller: &Caller) -> reqwest::RequestBuilder {
        let mut headers = HeaderMap::new();
        caller.identity.inject(&mut headers);
        if let Ok(id) = caller.request_id.parse() {
            headers.insert(X_REQUEST_ID, id);
        }
        self.client.request(method, url).headers(headers)
    }

    /// Send a JSON call. GETs are retried after transport errors.
    pub async fn send_json(
        &self,
        method: Method,
        url: Url,
        caller: &Caller,
        body: Option<&Value>,
    ) -> Result<UpstreamReply, ConsoleError> {
        let route = url.path().to_string();
        let max_attempts = if self.retries.enabled && method == Method::GET {
            self.retries.max_attempts.max(1)
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let start = Instant::now();

            let mut builder = self.request(method.clone(), url.clone(), caller);
            if let Some(body) = body {
                builder = builder.json(body);
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    metrics::record_upstream(method.as_str(), &route, status.as_u16(), start);
                    let bytes = response.bytes().await?;
                    return Ok(UpstreamReply {
                        status,
                        body: parse_lenient(&bytes),
                    });
                }
                Err(e) if attempt < max_attempts && (e.is_connect() || e.is_timeout()) => {
                    metrics::record_upstream(method.as_str(), &route, 0, start);
                    let delay = retry_delay(attempt, &self.retries);
                    tracing::info!(
                        request_id = %caller.request_id,
                        attempt,
                        delay = ?delay,
                        error = %e,
                        "Retrying backend call after network error"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    metrics::record_upstream(method.as_str(), &route, 0, start);
                    tracing::warn!(request_id = %caller.request_id, url = %url, error = %e, "Backend call failed");
                    return Err(e.into());
                }
            }
        }
    }

    /// Send a multipart form. Never retried.
    pub async fn send_multipart(
        &self,
        method: Method,
        url: Url,
        caller: &Caller,
        form: reqwest::multipart::Form,
    ) -> Result<UpstreamReply, ConsoleError> {
        let route = url.path().to_string();
        let start = Instant::now();
        let result = self.request(method.clone(), url, caller).multipart(form).send().await;

        match result {
            Ok(response) => {
                let status = response.status();
                metrics::record_upstream(method.as_str(), &route, status.as_u16(), start);
                let bytes = response.bytes().await?;
                Ok(UpstreamReply {
                    status,
                    body: parse_lenient(&bytes),
                })
            }
            Err(e) => {
                metrics::record_upstream(method.as_str(), &route, 0, start);
                tracing::warn!(request_id = %caller.request_id, error = %e, "Backend multipart call failed");
                Err(e.into())
            }
        }
    }

    /// Forward a body with the caller's own headers (minus `host`, `origin`
    /// and hop-by-hop ones) and relay the reply unchanged.
    pub async fn send_raw(
        &self,
        method: Method,
        url: Url,
        caller: &Caller,
        incoming: &HeaderMap,
        body: Bytes,
    ) -> Result<RawReply, ConsoleError> {
        let route = url.path().to_string();
        let mut headers = HeaderMap::new();
        for (name, value) in incoming {
            if name == header::HOST
                || name == header::ORIGIN
                || name == header::CONTENT_LENGTH
                || name == header::COOKIE
                || name == header::AUTHORIZATION
                || name == X_USER_ID
                || name == X_USER_EMAIL
                || name == X_REQUEST_ID
                || is_hop_by_hop(name)
            {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        // Identity comes from the session only, never from the caller's headers.
        caller.identity.inject(&mut headers);
        if let Ok(id) = caller.request_id.parse() {
            headers.insert(X_REQUEST_ID, id);
        }

        let start = Instant::now();
        let result = self
            .client
            .request(method.clone(), url)
            .headers(headers)
            .body(body)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                metrics::record_upstream(method.as_str(), &route, 0, start);
                tracing::warn!(request_id = %caller.request_id, error = %e, "Backend passthrough failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        metrics::record_upstream(method.as_str(), &route, status.as_u16(), start);

        let mut reply_headers = HeaderMap::new();
        for (name, value) in response.headers() {
            if name != header::CONTENT_LENGTH && !is_hop_by_hop(name) {
                reply_headers.append(name.clone(), value.clone());
            }
        }
        let body = response.bytes().await?;

        Ok(RawReply {
            status,
            headers: reply_headers,
            body,
        })
    }

    /// Fire-and-forget POST; failures are logged and dropped.
    pub fn notify(&self, url: Url, caller: Caller) {
        let request = self.request(Method::POST, url.clone(), &caller);
        tokio::spawn(async move {
            if let Err(e) = request.send().await {
                tracing::debug!(url = %url, error = %e, "Backend notification failed");
            }
        });
    }
}

/// Parse a reply body as JSON, falling back to `{}`.
pub fn parse_lenient(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| Value::Object(Default::default()))
}
