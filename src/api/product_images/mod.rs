//! Product image API (bearer-protected)

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, post},
};

use crate::core::ServerState;
use crate::services::image_storage::MAX_FILE_SIZE;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/products/images", post(handler::upload))
        .route("/api/products/images/{id}", delete(handler::delete))
        // Image bytes plus multipart framing overhead
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 64 * 1024))
}
