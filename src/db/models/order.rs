//! Order Model
//!
//! An order owns its line items (`order_item` table): they are created in
//! the same transaction as the order header, are immutable afterwards, and
//! are deleted with the order. Line items capture the unit price at order
//! time so historical orders stay accurate after later price changes.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Order ID type
pub type OrderId = RecordId;

/// Order status lifecycle: `pending` on creation; `delivered` and
/// `cancelled` are terminal states set via the status endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a status string; `None` for anything outside the recognized set
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Order header matching the SurrealDB `order` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user_id: RecordId,
    /// Sum of line-item price × quantity at creation time
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Order line item matching the SurrealDB `order_item` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    pub quantity: i64,
    /// Unit price captured at order time
    pub price: f64,
}

// =============================================================================
// Enriched read models (list/get endpoints)
// =============================================================================

/// Owning user, as embedded in order reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Referenced product summary, as embedded in line-item reads.
/// Fields other than `id` are `None` when the product has been deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
}

/// Line item enriched with its product summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDetail {
    pub quantity: i64,
    pub price: f64,
    pub product: ProductSummary,
}

/// Order enriched with user and product summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: String,
    pub user: Option<OrderUser>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemDetail>,
}

/// Flat row for the date-ranged order report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReportRow {
    pub id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            "\"delivered\""
        );
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!(OrderStatus::parse("delivered"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("cancelled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse("Delivered"), None);
    }
}
