//! Signed session tokens (HS256 JWT).

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried inside the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Shop owner uid as reported by the backend.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Bearer credential forwarded as `Authorization` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Backend idToken, kept for `verify`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Token id, used for revocation on logout.
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

impl SessionClaims {
    /// Fresh claims for `sub`, valid for `max_age_secs` from now.
    pub fn new(sub: impl Into<String>, max_age_secs: u64) -> Self {
        let now = unix_now();
        Self {
            sub: sub.into(),
            uid: None,
            email: None,
            name: None,
            access_token: None,
            id_token: None,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(max_age_secs),
        }
    }

    /// The uid: `sub` when non-empty, otherwise the `uid` claim.
    pub fn user_id(&self) -> Option<&str> {
        if !self.sub.is_empty() {
            return Some(self.sub.as_str());
        }
        self.uid.as_deref().filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to sign session token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("invalid session token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// HS256 key pair derived from the configured secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(SessionError::Sign)
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(SessionError::Invalid)
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_and_verify() {
        let keys = SessionKeys::new(SECRET);
        let mut claims = SessionClaims::new("uid-1", 600);
        claims.email = Some("owner@example.com".into());

        let token = keys.issue(&claims).unwrap();
        let verified = keys.verify(&token).unwrap();
        assert_eq!(verified, claims);
        assert_eq!(verified.user_id(), Some("uid-1"));
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = SessionKeys::new(SECRET)
            .issue(&SessionClaims::new("uid-1", 600))
            .unwrap();
        let other = SessionKeys::new(b"ffffffffffffffffffffffffffffffff");
        assert!(matches!(other.verify(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired() {
        let keys = SessionKeys::new(SECRET);
        let mut claims = SessionClaims::new("uid-1", 0);
        claims.exp = unix_now() - 10;
        let token = keys.issue(&claims).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_user_id_falls_back_to_uid_claim() {
        let mut claims = SessionClaims::new("", 60);
        assert_eq!(claims.user_id(), None);
        claims.uid = Some("uid-2".into());
        assert_eq!(claims.user_id(), Some("uid-2"));
    }
}
