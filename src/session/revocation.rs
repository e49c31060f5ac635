//! Revoked session ids.
//!
//! Logout clears the cookie, but a copied token would stay valid until it
//! expires. Revoked ids are kept here until their natural expiry.

use std::sync::Arc;

use dashmap::DashMap;

use crate::session::token::unix_now;

/// A thread-safe set of revoked token ids, each kept until its expiry.
#[derive(Clone, Default, Debug)]
pub struct RevocationList {
    inner: Arc<DashMap<String, u64>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke `jti` until `exp` (seconds since epoch).
    pub fn revoke(&self, jti: &str, exp: u64) {
        self.inner.insert(jti.to_string(), exp);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.inner.contains_key(jti)
    }

    /// Drop entries whose tokens have expired anyway. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = unix_now();
        let before = self.inner.len();
        self.inner.retain(|_, exp| *exp > now);
        before - self.inner.len()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_and_purge() {
        let list = RevocationList::new();
        let now = unix_now();

        list.revoke("live", now + 600);
        list.revoke("stale", now.saturating_sub(1));
        assert!(list.is_revoked("live"));
        assert!(list.is_revoked("stale"));
        assert!(!list.is_revoked("other"));

        assert_eq!(list.purge_expired(), 1);
        assert!(list.is_revoked("live"));
        assert!(!list.is_revoked("stale"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let list = RevocationList::new();
        let handle = list.clone();
        handle.revoke("a", unix_now() + 10);
        assert!(list.is_revoked("a"));
    }
}
