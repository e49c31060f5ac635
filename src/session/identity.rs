//! Resolving the caller's identity from an incoming request.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::session::cookies;
use crate::session::revocation::RevocationList;
use crate::session::token::{SessionClaims, SessionKeys};

pub const X_USER_ID: &str = "x-user-id";
pub const X_USER_EMAIL: &str = "x-user-email";

/// Who is calling, as far as the backend needs to know.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    /// Token id and expiry of the presented session, for revocation.
    pub session: Option<(String, u64)>,
}

impl Identity {
    /// The anonymous caller: no headers, no uid.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_claims(claims: SessionClaims) -> Self {
        let uid = claims.user_id().map(str::to_string);
        Self {
            uid,
            email: claims.email,
            access_token: claims.access_token,
            id_token: claims.id_token,
            session: Some((claims.jti, claims.exp)),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The single header that identifies this caller to the backend.
    ///
    /// A bearer credential wins, then the uid, then the email.
    pub fn outbound_header(&self) -> Option<(HeaderName, HeaderValue)> {
        if let Some(token) = self.access_token.as_deref() {
            return HeaderValue::from_str(&format!("Bearer {}", token))
                .ok()
                .map(|v| (header::AUTHORIZATION, v));
        }
        if let Some(uid) = self.uid.as_deref() {
            return HeaderValue::from_str(uid)
                .ok()
                .map(|v| (HeaderName::from_static(X_USER_ID), v));
        }
        self.email
            .as_deref()
            .and_then(|email| HeaderValue::from_str(email).ok())
            .map(|v| (HeaderName::from_static(X_USER_EMAIL), v))
    }

    /// Apply [`Identity::outbound_header`] to a header map.
    pub fn inject(&self, headers: &mut HeaderMap) {
        if let Some((name, value)) = self.outbound_header() {
            headers.insert(name, value);
        }
    }
}

/// Pull the raw session token from the cookie, or from `Authorization: Bearer`.
pub fn presented_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = cookies::read(headers, cookie_name).filter(|t| !t.is_empty()) {
        return Some(token);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve the caller. Bad, expired, or revoked tokens yield `None`.
pub fn resolve(
    headers: &HeaderMap,
    keys: &SessionKeys,
    revoked: &RevocationList,
    cookie_name: &str,
) -> Option<Identity> {
    let token = presented_token(headers, cookie_name)?;
    match keys.verify(&token) {
        Ok(claims) if revoked.is_revoked(&claims.jti) => {
            tracing::debug!(jti = %claims.jti, "Rejected revoked session token");
            None
        }
        Ok(claims) => Some(Identity::from_claims(claims)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unusable session token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_header_precedence() {
        let mut identity = Identity {
            uid: Some("u1".into()),
            email: Some("a@b.c".into()),
            access_token: Some("tok".into()),
            ..Default::default()
        };
        let (name, value) = identity.outbound_header().unwrap();
        assert_eq!(name, header::AUTHORIZATION);
        assert_eq!(value, "Bearer tok");

        identity.access_token = None;
        let (name, value) = identity.outbound_header().unwrap();
        assert_eq!(name.as_str(), X_USER_ID);
        assert_eq!(value, "u1");

        identity.uid = None;
        let (name, value) = identity.outbound_header().unwrap();
        assert_eq!(name.as_str(), X_USER_EMAIL);
        assert_eq!(value, "a@b.c");

        identity.email = None;
        assert!(identity.outbound_header().is_none());
    }

    #[test]
    fn test_resolve_from_cookie() {
        let keys = SessionKeys::new(SECRET);
        let token = keys.issue(&SessionClaims::new("uid-9", 600)).unwrap();
        let headers = cookie_headers(&format!("idToken={}", token));

        let identity = resolve(&headers, &keys, &RevocationList::new(), "idToken").unwrap();
        assert_eq!(identity.uid.as_deref(), Some("uid-9"));
        assert!(identity.is_authenticated());
    }

    #[test]
    fn test_resolve_from_bearer_header() {
        let keys = SessionKeys::new(SECRET);
        let token = keys.issue(&SessionClaims::new("uid-3", 600)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let identity = resolve(&headers, &keys, &RevocationList::new(), "idToken").unwrap();
        assert_eq!(identity.uid.as_deref(), Some("uid-3"));
    }

    #[test]
    fn test_revoked_and_garbage_tokens_resolve_to_none() {
        let keys = SessionKeys::new(SECRET);
        let claims = SessionClaims::new("uid-9", 600);
        let token = keys.issue(&claims).unwrap();
        let revoked = RevocationList::new();
        revoked.revoke(&claims.jti, claims.exp);

        let headers = cookie_headers(&format!("idToken={}", token));
        assert!(resolve(&headers, &keys, &revoked, "idToken").is_none());

        let garbage = cookie_headers("idToken=not-a-jwt");
        assert!(resolve(&garbage, &keys, &RevocationList::new(), "idToken").is_none());
        assert!(resolve(&HeaderMap::new(), &keys, &RevocationList::new(), "idToken").is_none());
    }
}
