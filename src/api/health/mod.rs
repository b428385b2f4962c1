//! Health check route (public)

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

/// GET /api/health
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    // A trivial query verifies the embedded database answers
    let database = match state.db.query("RETURN 1").await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Health check database probe failed");
            "error"
        }
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
