//! Shop console server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser / SDK                     ┌──────────────────────────────────────┐
//!   ──────────────────────────────────▶  request id → trace → limits         │
//!                                     │        │                             │
//!                                     │        ▼                             │
//!                                     │   page guard ── 307 /login, /        │
//!                                     │        │                             │
//!                                     │        ▼                             │
//!                                     │  /api/{auth,menu,tables,store}       │
//!                                     │   session → identity → shape         │
//!                                     │        │                             │
//!                                     │        ▼                             │
//!                                     │   upstream client ── fallback  ──────┼──▶ Backend API
//!                                     │                                      │
//!                                     │  config reload · metrics · shutdown  │
//!                                     └──────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use shop_console::config::loader::{default_config, load_config};
use shop_console::config::schema::DEFAULT_SESSION_SECRET;
use shop_console::config::watcher::ConfigWatcher;
use shop_console::config::Overrides;
use shop_console::lifecycle::signals::spawn_signal_handler;
use shop_console::net::tls::load_tls_config;
use shop_console::observability::{logging, metrics};
use shop_console::{ConsoleServer, Shutdown};

#[derive(Parser)]
#[command(name = "shop-console")]
#[command(about = "Session-gated admin console for the shop backend", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend API base URL.
    #[arg(long, env = "CONSOLE_API_BASE")]
    api_base: Option<String>,

    /// Secret used to sign session tokens.
    #[arg(long, env = "CONSOLE_SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Listen address, e.g. 0.0.0.0:3000.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        bind_address: cli.bind,
        api_base: cli.api_base,
        session_secret: cli.session_secret,
    };

    let config = match &cli.config {
        Some(path) => load_config(path, &overrides)?,
        None => default_config(&overrides)?,
    };

    logging::init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "shop-console starting");

    if config.session.secret == DEFAULT_SESSION_SECRET {
        tracing::warn!("Using the default session secret; set CONSOLE_SESSION_SECRET in production");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        cookie = %config.session.cookie_name,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    // Keep the watcher alive for the life of the process.
    let (config_updates, _watcher) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, overrides.clone());
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_tx, updates) = tokio::sync::mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = ConsoleServer::new(config)?;

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await?;
            let addr: SocketAddr = bind_address.parse()?;
            server.run_tls(addr, rustls, config_updates, &shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, config_updates, &shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
