//! Network layer subsystem.
//!
//! Plain TCP listeners are bound directly in `main`; this module only loads
//! the rustls configuration used when `listener.tls` is set.

pub mod tls;
