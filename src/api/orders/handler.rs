//! Order Handlers
//!
//! Placement runs for the authenticated user: the token subject becomes the
//! order's owner. The heavy lifting (pricing, stock, atomic commit) lives in
//! the order service.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderDetail};
use crate::services::LineItemRequest;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct OrderCreateRequest {
    /// Requested line items: `[{"id": "product:…", "quantity": n}, …]`
    #[serde(default)]
    pub products: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OrderAck {
    pub status: bool,
    pub message: String,
    pub order: OrderDetail,
}

/// GET /api/orders
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<OrderDetail>>> {
    let orders = state.order_service().list_orders().await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let order = state.order_service().get_order(&id).await?;
    Ok(Json(order))
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OrderCreateRequest>,
) -> AppResult<(StatusCode, Json<OrderAck>)> {
    let order = state
        .order_service()
        .place_order(&user.id, &payload.products)
        .await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.id,
        total = order.total,
        items = order.items.len(),
        "Order placed"
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderAck {
            status: true,
            message: "Order placed successfully".into(),
            order,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct StatusAck {
    pub status: bool,
    pub message: String,
    pub order: Order,
}

/// PATCH /api/orders/:id/status
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusChangeRequest>,
) -> AppResult<Json<StatusAck>> {
    let order = state
        .order_service()
        .change_status(&id, &payload.status)
        .await?;

    tracing::info!(order_id = %id, status = %payload.status, "Order status changed");

    Ok(Json(StatusAck {
        status: true,
        message: format!("Order marked as {}", payload.status),
        order,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteAck {
    pub status: bool,
    pub message: String,
}

/// DELETE /api/orders/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteAck>> {
    state.order_service().delete_order(&id).await?;

    tracing::info!(order_id = %id, "Order deleted");

    Ok(Json(DeleteAck {
        status: true,
        message: "Order deleted successfully".into(),
    }))
}
