//! Order API (bearer-protected)

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list).post(handler::create))
        .route(
            "/api/orders/{id}",
            get(handler::get_by_id).delete(handler::delete),
        )
        .route("/api/orders/{id}/status", patch(handler::change_status))
}
