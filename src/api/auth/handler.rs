//! Auth Handlers
//!
//! Login issues a bearer token; logout revokes the presented token by its
//! `jti` until it would have expired anyway.

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserPublic;
use crate::db::repository::UserRepository;
use crate::utils::validation::{MAX_PASSWORD_LEN, validate_email, validate_required_text};
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: bool,
    pub token: String,
    pub user: UserPublic,
}

/// POST /api/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_email(&req.email)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;

    let repo = UserRepository::new(state.get_db());
    let user = repo.find_by_email(&req.email).await?;

    // Fixed delay before inspecting the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified failure path: unknown email and wrong password are
    // indistinguishable to the caller
    let user = match user {
        Some(user) => {
            let password_valid = user
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            user
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let (token, _claims) = state
        .jwt_service()
        .generate_token(&user_id, &user.name, &user.email)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user_id, email = %user.email, "User logged in");

    Ok(Json(LoginResponse {
        status: true,
        token,
        user: UserPublic::from(&user),
    }))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub status: bool,
    pub message: &'static str,
}

/// POST /api/logout (bearer-protected)
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<LogoutResponse>> {
    state.jwt_service().revoke(&user.token_id, user.token_exp);

    tracing::info!(user_id = %user.id, email = %user.email, "User logged out");

    Ok(Json(LogoutResponse {
        status: true,
        message: "Logged out successfully",
    }))
}
