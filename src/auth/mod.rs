//! Authentication: JWT tokens + Argon2 password hashing
//!
//! - [`JwtService`] issues, validates and revokes bearer tokens
//! - [`middleware::require_auth`] guards the protected API routes
//! - [`CurrentUser`] is the authenticated identity injected into requests

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};

/// Authenticated user attached to the request extensions by the middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// "user:id" record id string
    pub id: String,
    pub name: String,
    pub email: String,
    /// Token ID, needed to revoke the current token on logout
    pub token_id: String,
    /// Token expiry timestamp
    pub token_exp: i64,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            token_id: claims.jti,
            token_exp: claims.exp,
        }
    }
}
