//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → request.rs (request ID)
//!     → server.rs (tracing, limits, timeout, page guard)
//!     → api handlers / static pages
//!     → response.rs (raw backend replies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, ConsoleServer};
