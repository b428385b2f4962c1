//! Auth API: login and logout

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/login", post(handler::login))
        .route("/api/logout", post(handler::logout))
}
