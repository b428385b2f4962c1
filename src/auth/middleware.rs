//! Authentication middleware
//!
//! Bearer-token middleware for the protected API routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Routes that skip authentication entirely:
///
/// - `OPTIONS *` (CORS preflight)
/// - anything outside `/api/`
/// - `POST /api/login`, `POST /api/users` (registration), `GET /api/health`
/// - product catalogue *reads* (`GET /api/products…`), except the image
///   routes under `/api/products/images`
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_api_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(uri = %req.uri(), "Request without authorization header");
            return Err(AppError::unauthorized());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(error = %e, uri = %req.uri(), "Token validation failed");
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

fn is_public_api_route(method: &http::Method, path: &str) -> bool {
    if path == "/api/health" {
        return true;
    }
    if method == http::Method::POST && (path == "/api/login" || path == "/api/users") {
        return true;
    }
    // Browsing the catalogue is public; managing it is not
    if method == http::Method::GET
        && path.starts_with("/api/products")
        && !path.starts_with("/api/products/images")
    {
        return true;
    }
    false
}
