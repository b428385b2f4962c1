//! JWT token service
//!
//! Token generation, validation and revocation. Logout revokes the current
//! token by its `jti`; the deny-list is consulted on every validation and
//! pruned as entries pass their expiry.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match load_jwt_secret() {
            Ok(secret) => secret,
            Err(e) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("JWT configuration error: {}, using a generated key", e);
                    generate_printable_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("FATAL: JWT_SECRET configuration failed: {}", e);
                }
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 24h default
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "store-api".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "store-clients".to_string()),
        }
    }
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject), "user:id" form
    pub sub: String,
    /// User display name
    pub name: String,
    /// User email
    pub email: String,
    /// Token ID, used for revocation
    pub jti: String,
    /// Expiry timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token revoked")]
    RevokedToken,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Load the JWT secret from the environment, enforcing a minimum length
fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret)
        }
        Err(_) => Err(JwtError::ConfigError("JWT_SECRET is not set".to_string())),
    }
}

/// Generate a printable random secret (development fallback)
fn generate_printable_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

    let rng = SystemRandom::new();
    let mut key = String::with_capacity(64);
    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "StoreApiDevelopmentOnlyFallbackKey2026!".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.as_bytes()[idx] as char);
    }
    key
}

/// JWT service: issues, validates and revokes bearer tokens
#[derive(Debug)]
pub struct JwtService {
    config: JwtConfig,
    /// Revoked token IDs mapped to their expiry timestamps
    revoked: DashMap<String, i64>,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config,
            revoked: DashMap::new(),
        }
    }

    /// Issue a token for a user. Returns the encoded token and its claims.
    pub fn generate_token(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
    ) -> Result<(String, Claims), JwtError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;

        Ok((token, claims))
    }

    /// Validate a token: signature, expiry, issuer/audience, revocation
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            _ => JwtError::InvalidToken(e.to_string()),
        })?;

        if self.revoked.contains_key(&data.claims.jti) {
            return Err(JwtError::RevokedToken);
        }

        Ok(data.claims)
    }

    /// Revoke a token until its natural expiry
    pub fn revoke(&self, jti: &str, exp: i64) {
        self.revoked.insert(jti.to_string(), exp);

        // Drop entries for tokens that have expired anyway
        let now = Utc::now().timestamp();
        self.revoked.retain(|_, e| *e > now);
    }

    /// Extract the token from an `Authorization: Bearer <token>` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-that-is-long-enough-00".to_string(),
            expiration_minutes: 60,
            issuer: "store-api".to_string(),
            audience: "store-clients".to_string(),
        })
    }

    #[test]
    fn issue_and_validate() {
        let svc = service();
        let (token, claims) = svc
            .generate_token("user:u1", "Ana", "ana@example.com")
            .unwrap();

        let validated = svc.validate_token(&token).unwrap();
        assert_eq!(validated.sub, "user:u1");
        assert_eq!(validated.email, "ana@example.com");
        assert_eq!(validated.jti, claims.jti);
    }

    #[test]
    fn revoked_token_is_rejected() {
        let svc = service();
        let (token, claims) = svc
            .generate_token("user:u1", "Ana", "ana@example.com")
            .unwrap();

        svc.revoke(&claims.jti, claims.exp);
        assert!(matches!(
            svc.validate_token(&token),
            Err(JwtError::RevokedToken)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let (token, _) = svc
            .generate_token("user:u1", "Ana", "ana@example.com")
            .unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(
            svc.validate_token(&tampered),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn header_extraction() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }
}
