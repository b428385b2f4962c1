//! Report Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct OrdersReportRequest {
    /// Inclusive range start, `YYYY-MM-DD`
    pub start_date: String,
    /// Inclusive range end, `YYYY-MM-DD`
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct OrdersReportResponse {
    pub status: bool,
    /// Download URL under the static file route
    pub url: String,
}

/// POST /api/report/orders
pub async fn orders_report(
    State(state): State<ServerState>,
    Json(req): Json<OrdersReportRequest>,
) -> AppResult<Json<OrdersReportResponse>> {
    let url = state
        .report_service()
        .build_orders_report(&req.start_date, &req.end_date)
        .await?;

    Ok(Json(OrdersReportResponse { status: true, url }))
}
