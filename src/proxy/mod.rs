//! Request proxy subsystem.
//!
//! # Data Flow
//! ```text
//! api handler
//!     → upstream.rs (URL + identity header + request id, JSON/multipart/raw)
//!     → backend API
//!     → fallback.rs (Read / Write / Relay substitution on 5xx or no reply)
//!     → caller
//! ```

pub mod fallback;
pub mod upstream;

pub use fallback::Fallback;
pub use upstream::{Caller, RawReply, Upstream, UpstreamReply};
