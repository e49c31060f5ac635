//! Resilience helpers for upstream calls.
//!
//! Only GET calls are retried, and only after transport errors; a reply
//! from the backend, even a 5xx, is final and goes through the fallback
//! policy instead.

pub mod backoff;
