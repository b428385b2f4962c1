//! User Handlers
//!
//! Registration is public and logs the new user straight in: the response
//! carries both the public user view and a fresh bearer token.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{UserCreate, UserPublic};
use crate::db::repository::UserRepository;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_email, validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: bool,
    pub token: String,
    pub user: UserPublic,
}

/// POST /api/users
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let repo = UserRepository::new(state.get_db());
    let user = repo.create(payload).await?;

    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let (token, _claims) = state
        .jwt_service()
        .generate_token(&user_id, &user.name, &user.email)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user_id, email = %user.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: true,
            token,
            user: UserPublic::from(&user),
        }),
    ))
}
