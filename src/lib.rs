//! Shop console library.
//!
//! A session-gated admin console for a restaurant point-of-sale backend:
//! it issues session cookies, guards the dashboard pages, and proxies menu,
//! table and store calls to the backend API with the caller's identity.

// Core subsystems
pub mod api;
pub mod config;
pub mod guard;
pub mod http;
pub mod net;
pub mod proxy;
pub mod session;
pub mod shape;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::ConsoleConfig;
pub use error::ConsoleError;
pub use http::ConsoleServer;
pub use lifecycle::Shutdown;
