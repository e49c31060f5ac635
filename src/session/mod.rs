//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! login (api/auth.rs)
//!     → token.rs (sign claims: uid, email, backend idToken, expiry)
//!     → cookies.rs (Set-Cookie: HttpOnly, SameSite=Lax)
//!
//! every proxied call
//!     → identity.rs (cookie or Bearer → verify → Identity)
//!     → revocation.rs (reject tokens revoked by logout)
//!     → Identity::inject (Authorization | x-user-id | x-user-email)
//! ```

pub mod cookies;
pub mod identity;
pub mod revocation;
pub mod token;

pub use identity::{resolve, Identity};
pub use revocation::RevocationList;
pub use token::{SessionClaims, SessionError, SessionKeys};
