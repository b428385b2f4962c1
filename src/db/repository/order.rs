//! Order Repository
//!
//! Reads return orders enriched with the owning user and per-line product
//! summaries via subqueries. Order *creation* is not here: the placement
//! transaction (stock + header + line items as one unit) is owned by the
//! order service.

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoResult, parse_record_id};
use crate::db::models::{Order, OrderDetail, OrderLineItem, OrderReportRow, OrderStatus};
use crate::utils::time::now_rfc3339;

/// Projection shared by the list and get queries
const DETAIL_FIELDS: &str = r#"
    <string>id AS id,
    { id: <string>user_id, name: user_id.name, email: user_id.email } AS user,
    total,
    status,
    created_at,
    updated_at,
    (SELECT
        quantity,
        price,
        { id: <string>product_id, name: product_id.name, price: product_id.price } AS product
     FROM order_item WHERE order_id = $parent.id) AS items
"#;

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All orders, newest first, enriched with user and product summaries
    pub async fn find_all_detailed(&self) -> RepoResult<Vec<OrderDetail>> {
        let query = format!("SELECT {DETAIL_FIELDS} FROM order");
        let mut orders: Vec<OrderDetail> = self.base.db().query(query).await?.take(0)?;
        // Fixed-width timestamps sort chronologically as strings
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// One order, enriched. `None` for unknown ids.
    pub async fn find_detailed(&self, id: &str) -> RepoResult<Option<OrderDetail>> {
        let thing = parse_record_id(id)?;
        let query = format!("SELECT {DETAIL_FIELDS} FROM order WHERE id = $id");
        let mut result = self.base.db().query(query).bind(("id", thing)).await?;
        let orders: Vec<OrderDetail> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Raw order header
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Line items belonging to an order
    pub async fn find_items(&self, order_id: &RecordId) -> RepoResult<Vec<OrderLineItem>> {
        let items: Vec<OrderLineItem> = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE order_id = $order")
            .bind(("order", order_id.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Set the order status. Returns the updated header, `None` for unknown ids.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET status = $status, updated_at = $now RETURN AFTER")
            .bind(("id", thing))
            .bind(("status", status.as_str()))
            .bind(("now", now_rfc3339()))
            .await?;
        let updated: Option<Order> = result.take(0)?;
        Ok(updated)
    }

    /// Delete an order and all of its line items in one transaction, so a
    /// failure mid-delete cannot leave orphaned line items.
    pub async fn delete_with_items(&self, id: &str) -> RepoResult<()> {
        let thing = parse_record_id(id)?;
        self.base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                DELETE order_item WHERE order_id = $id;
                DELETE $id;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("id", thing))
            .await?
            .check()?;
        Ok(())
    }

    /// Orders created in `[start, end)` (fixed-width RFC 3339 bounds),
    /// flattened for the report builder
    pub async fn find_report_rows(
        &self,
        start: String,
        end: String,
    ) -> RepoResult<Vec<OrderReportRow>> {
        let rows: Vec<OrderReportRow> = self
            .base
            .db()
            .query(
                r#"SELECT
                    <string>id AS id,
                    user_id.name AS customer_name,
                    user_id.email AS customer_email,
                    total,
                    status,
                    created_at
                FROM order
                WHERE created_at >= $start AND created_at < $end
                ORDER BY created_at"#,
            )
            .bind(("start", start))
            .bind(("end", end))
            .await?
            .take(0)?;
        Ok(rows)
    }
}
