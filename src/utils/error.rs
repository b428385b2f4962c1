//! Unified error handling
//!
//! Provides the application error type and its HTTP mapping:
//! - [`AppError`] - application error enum
//! - `IntoResponse` - JSON error bodies with the matching status code
//!
//! # Response shape
//!
//! | Failure | Status | Body |
//! |---------|--------|------|
//! | Validation (single message) | 400 | `{"error": "..."}` |
//! | Validation (field-scoped)   | 400 | `{"errors": {"field": ["..."]}}` |
//! | Invalid credentials         | 401 | `{"errors": {"email": ["..."]}}` |
//! | Missing / bad token         | 401 | `{"error": "..."}` |
//! | Not found                   | 404 | `{"error": "..."}` |
//! | Insufficient stock          | 422 | `{"error": "..."}` |
//! | Database / internal         | 500 | `{"error": "..."}` |

use std::collections::HashMap;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // ========== Business logic errors (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Field-scoped validation errors, keyed by field name
    #[error("Validation failed")]
    Fields(HashMap<String, Vec<String>>),

    #[error("Insufficient stock for product: {0}")]
    InsufficientStock(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    // ========== System errors (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Authentication required" }),
            ),
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Token expired" }))
            }
            AppError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Invalid token" }))
            }
            // Field-scoped on purpose: the login form surfaces this under the
            // email input, and a single message avoids username enumeration.
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "status": false, "errors": { "email": ["Invalid credentials."] } }),
            ),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Fields(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "status": false, "errors": errors }),
            ),

            // Business rule violations (4xx)
            AppError::InsufficientStock(product) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": format!("Insufficient stock for product: {product}") }),
            ),
            AppError::InvalidStatus(status) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Invalid status: {status}") }),
            ),

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Multipart error: {}", e))
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Single field-scoped validation error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::Fields(errors)
    }

    pub fn insufficient_stock(product: impl Into<String>) -> Self {
        Self::InsufficientStock(product.into())
    }

    pub fn invalid_status(status: impl Into<String>) -> Self {
        Self::InvalidStatus(status.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    /// Unified message to prevent username enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }
}

/// Result type for API handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_maps_to_422() {
        let resp = AppError::insufficient_stock("Keyboard (product:k1)").into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = AppError::not_found("Order order:1 not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn field_errors_map_to_400() {
        let resp = AppError::field("quantity", "quantity must be at least 1").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_error_hides_detail() {
        // The internal message must not leak into the display used for bodies
        let err = AppError::database("connection refused on private host");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
