//! Report API (bearer-protected)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/report/orders", post(handler::orders_report))
}
