//! Product API
//!
//! Reads are public; writes require a bearer token (enforced by the auth
//! middleware, not here). Routes are registered with full paths so the
//! static `/api/products/images` routes can coexist with `/{id}`.

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(handler::list).post(handler::create))
        .route(
            "/api/products/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/api/products/{id}/status", patch(handler::toggle_status))
}
