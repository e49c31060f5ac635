//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the API handlers and the page fallback
//! - Wire up middleware (page guard, timeout, body limit, tracing, request ID)
//! - Swap in reloaded configuration without dropping connections
//! - Purge expired revocations in the background
//! - Serve over plain TCP or TLS with graceful shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    limit::RequestBodyLimitLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::guard;
use crate::http::request::RequestIdLayer;
use crate::lifecycle::Shutdown;
use crate::proxy::Upstream;
use crate::session::{self, Identity, RevocationList, SessionKeys};

const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Everything derived from one configuration snapshot.
pub struct ConsoleInner {
    pub config: ConsoleConfig,
    pub upstream: Upstream,
    pub keys: SessionKeys,
}

impl ConsoleInner {
    pub fn from_config(config: ConsoleConfig) -> Result<Self, ConsoleError> {
        let upstream = Upstream::new(&config.upstream, config.retries.clone())?;
        let keys = SessionKeys::new(config.session.secret.as_bytes());
        Ok(Self {
            config,
            upstream,
            keys,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<ConsoleInner>>,
    pub revoked: RevocationList,
}

impl AppState {
    pub fn new(config: ConsoleConfig) -> Result<Self, ConsoleError> {
        let inner = ConsoleInner::from_config(config)?;
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(inner)),
            revoked: RevocationList::new(),
        })
    }

    /// The current configuration snapshot.
    pub fn load(&self) -> Arc<ConsoleInner> {
        self.inner.load_full()
    }

    /// Resolve the caller against the current session keys.
    pub fn identity(&self, headers: &HeaderMap) -> Option<Identity> {
        let inner = self.inner.load();
        session::resolve(
            headers,
            &inner.keys,
            &self.revoked,
            &inner.config.session.cookie_name,
        )
    }

    /// Swap in a new configuration. On error the old one stays active.
    pub fn reload(&self, config: ConsoleConfig) -> Result<(), ConsoleError> {
        let inner = ConsoleInner::from_config(config)?;
        self.inner.store(Arc::new(inner));
        Ok(())
    }
}

/// HTTP server for the console.
pub struct ConsoleServer {
    router: Router,
    state: AppState,
}

impl ConsoleServer {
    pub fn new(config: ConsoleConfig) -> Result<Self, ConsoleError> {
        let state = AppState::new(config.clone())?;
        let router = Self::build_router(&config, state.clone());
        Ok(Self { router, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Timeout, body limit and static directory are read once here; changing
    /// them needs a restart.
    #[allow(deprecated)]
    fn build_router(config: &ConsoleConfig, state: AppState) -> Router {
        let max_body = config.security.max_body_size;

        let router = Router::new()
            .route("/healthz", get(api::health::get_status))
            .route("/api/auth", post(api::auth::dispatch_query))
            .route("/api/auth/{action}", post(api::auth::dispatch_path))
            .route(
                "/api/menu",
                get(api::menu::list)
                    .post(api::menu::create)
                    .put(api::menu::update)
                    .delete(api::menu::remove),
            )
            .route(
                "/api/tables",
                get(api::tables::list)
                    .post(api::tables::create)
                    .delete(api::tables::remove),
            )
            .route(
                "/api/store",
                get(api::store::fetch).post(api::store::submit),
            );

        let router = match config.security.static_dir.as_deref() {
            Some(dir) => {
                let index = Path::new(dir).join("index.html");
                router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
            }
            None => router.fallback(not_found),
        };

        router
            .layer(middleware::from_fn_with_state(state.clone(), guard::page_guard))
            .with_state(state)
            .layer(DefaultBodyLimit::max(max_body))
            .layer(RequestBodyLimitLayer::new(max_body))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.upstream.request_timeout_secs.saturating_add(5),
            )))
            .layer(TraceLayer::new_for_http())
            .layer(RequestIdLayer)
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ConsoleConfig>,
        shutdown: &Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        spawn_background(&self.state, config_updates, shutdown);

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let mut stop = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<ConsoleConfig>,
        shutdown: &Shutdown,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        spawn_background(&self.state, config_updates, shutdown);

        let handle = axum_server::Handle::new();
        let mut stop = shutdown.subscribe();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = stop.recv().await;
            drain.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Config reload and revocation purge tasks; both stop on shutdown.
fn spawn_background(
    state: &AppState,
    mut config_updates: mpsc::UnboundedReceiver<ConsoleConfig>,
    shutdown: &Shutdown,
) {
    let reload_state = state.clone();
    let mut stop = shutdown.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = config_updates.recv() => {
                    let Some(config) = update else { break };
                    match reload_state.reload(config) {
                        Ok(()) => tracing::info!("Configuration swapped in"),
                        Err(e) => tracing::error!(error = %e, "Reloaded configuration rejected"),
                    }
                }
                _ = stop.recv() => break,
            }
        }
    });

    let revoked = state.revoked.clone();
    let mut stop = shutdown.subscribe();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(REVOCATION_PURGE_INTERVAL);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let purged = revoked.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, remaining = revoked.len(), "Purged expired revocations");
                    }
                }
                _ = stop.recv() => break,
            }
        }
    });
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_swaps_upstream() {
        let state = AppState::new(ConsoleConfig::default()).unwrap();
        assert_eq!(state.load().upstream.base().as_str(), "http://localhost:4000/");

        let mut config = ConsoleConfig::default();
        config.upstream.base_url = "http://backend:9000".to_string();
        state.reload(config).unwrap();
        assert_eq!(state.load().upstream.base().as_str(), "http://backend:9000/");
    }

    #[test]
    fn test_bad_reload_keeps_previous() {
        let state = AppState::new(ConsoleConfig::default()).unwrap();
        let mut config = ConsoleConfig::default();
        config.upstream.base_url = "not a url".to_string();
        assert!(state.reload(config).is_err());
        assert_eq!(state.load().upstream.base().as_str(), "http://localhost:4000/");
    }
}
