//! Page guard.
//!
//! Redirects requests without a session cookie away from protected pages,
//! and requests with one away from the login and signup pages. Only the
//! cookie's presence is checked; the API resolves and verifies it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::config::GuardConfig;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::cookies;

/// Paths the guard never touches.
const EXEMPT_PREFIXES: [&str; 2] = ["/api", "/healthz"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Pass,
    /// Send to the login page; carries the full `Location`.
    ToLogin(String),
    /// Send to the home page.
    ToHome(String),
}

/// `path` equals `prefix` or continues it with a `/`.
fn matches(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn matches_any(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| matches(path, p))
}

pub fn is_exempt(path: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|p| matches(path, p))
}

/// Decide what to do with a page request.
pub fn decide(config: &GuardConfig, path: &str, has_session: bool) -> Decision {
    if is_exempt(path) {
        return Decision::Pass;
    }

    if !has_session && matches_any(path, &config.protected_prefixes) {
        let from: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
        return Decision::ToLogin(format!("{}?from={}", config.login_path, from));
    }

    if has_session && matches_any(path, &config.auth_prefixes) {
        return Decision::ToHome(config.home_path.clone());
    }

    Decision::Pass
}

/// Middleware applying [`decide`] to every request.
pub async fn page_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if is_exempt(&path) {
        return next.run(request).await;
    }

    let inner = state.load();
    let has_session = cookies::read(request.headers(), &inner.config.session.cookie_name)
        .is_some_and(|v| !v.is_empty());

    match decide(&inner.config.guard, &path, has_session) {
        Decision::Pass => next.run(request).await,
        Decision::ToLogin(location) => {
            tracing::debug!(path = %path, "No session, redirecting to login");
            metrics::record_guard_redirect("login");
            Redirect::temporary(&location).into_response()
        }
        Decision::ToHome(location) => {
            tracing::debug!(path = %path, "Session present, redirecting home");
            metrics::record_guard_redirect("home");
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_without_session() {
        let config = GuardConfig::default();
        assert_eq!(
            decide(&config, "/menu", false),
            Decision::ToLogin("/login?from=%2Fmenu".to_string())
        );
        assert_eq!(
            decide(&config, "/menu/add", false),
            Decision::ToLogin("/login?from=%2Fmenu%2Fadd".to_string())
        );
        assert_eq!(
            decide(&config, "/", false),
            Decision::ToLogin("/login?from=%2F".to_string())
        );
    }

    #[test]
    fn test_prefix_needs_separator() {
        let config = GuardConfig::default();
        assert_eq!(decide(&config, "/menuitems", false), Decision::Pass);
        assert_eq!(decide(&config, "/assets/app.js", false), Decision::Pass);
    }

    #[test]
    fn test_auth_pages_with_session() {
        let config = GuardConfig::default();
        assert_eq!(decide(&config, "/login", true), Decision::ToHome("/".to_string()));
        assert_eq!(decide(&config, "/signup", true), Decision::ToHome("/".to_string()));
        assert_eq!(decide(&config, "/login", false), Decision::Pass);
        assert_eq!(decide(&config, "/store", true), Decision::Pass);
    }

    #[test]
    fn test_api_is_never_guarded() {
        let config = GuardConfig::default();
        assert_eq!(decide(&config, "/api/menu", false), Decision::Pass);
        assert_eq!(decide(&config, "/healthz", false), Decision::Pass);
    }

    #[test]
    fn test_custom_paths() {
        let config = GuardConfig {
            protected_prefixes: vec!["/admin".to_string()],
            auth_prefixes: vec!["/sign-in".to_string()],
            login_path: "/sign-in".to_string(),
            home_path: "/admin".to_string(),
        };
        assert_eq!(
            decide(&config, "/admin/x", false),
            Decision::ToLogin("/sign-in?from=%2Fadmin%2Fx".to_string())
        );
        assert_eq!(decide(&config, "/sign-in", true), Decision::ToHome("/admin".to_string()));
        assert_eq!(decide(&config, "/menu", false), Decision::Pass);
    }
}
