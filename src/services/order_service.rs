//! Order Engine
//!
//! Order placement, status transitions and deletion. Placement is the one
//! multi-entity write in the system: stock deductions, the order header and
//! the line items commit as a single SurrealDB transaction, so either every
//! effect is applied or none is.

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::{Order, OrderDetail, OrderStatus, Product};
use crate::db::repository::{OrderRepository, ProductRepository, UserRepository};
use crate::utils::money::{self, MAX_QUANTITY};
use crate::utils::time::now_rfc3339;
use crate::utils::AppError;

/// Marker embedded in the transaction's THROW message; placement maps it
/// back to an `InsufficientStock` failure after rollback.
const INSUFFICIENT_STOCK_MARKER: &str = "INSUFFICIENT_STOCK";

/// Attempts per placement when the storage engine reports a retryable
/// commit conflict (two transactions touching the same product rows).
const COMMIT_ATTEMPTS: usize = 3;

/// One requested line item: `{"id": "product:…", "quantity": n}`
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemRequest {
    pub id: String,
    pub quantity: i64,
}

/// A priced line, resolved against the catalogue before committing
struct PricedLine {
    product_id: RecordId,
    quantity: i64,
    unit_price: f64,
}

#[derive(Clone)]
pub struct OrderService {
    db: Surreal<Db>,
}

impl OrderService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }

    /// Place an order: validate, price, then commit stock deductions, the
    /// order header and its line items atomically.
    ///
    /// Failure modes: `NotFound` (user or product, before any mutation),
    /// `InsufficientStock` (pre-check or the transaction's conditional
    /// update; either way nothing is committed), `Database` (storage error;
    /// the transaction has rolled back).
    pub async fn place_order(
        &self,
        user_id: &str,
        items: &[LineItemRequest],
    ) -> Result<OrderDetail, AppError> {
        validate_items(items)?;

        let user = self
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))?;
        let user_rid = user
            .id
            .ok_or_else(|| AppError::internal("User record without id"))?;

        // Resolve and price every line before touching anything. Prices are
        // captured here; later catalogue price changes must not affect this
        // order.
        let mut lines = Vec::with_capacity(items.len());
        let mut total = rust_decimal::Decimal::ZERO;
        for item in items {
            let product = self.resolve_product(&item.id).await?;
            let product_rid = product
                .id
                .clone()
                .ok_or_else(|| AppError::internal("Product record without id"))?;

            // Advisory pre-check for a friendly error message; the
            // transaction's conditional update is what actually guarantees
            // stock never goes negative under concurrency.
            if product.stock < item.quantity {
                return Err(AppError::insufficient_stock(product_label(&product)));
            }

            total += money::line_total(product.price, item.quantity);
            lines.push(PricedLine {
                product_id: product_rid,
                quantity: item.quantity,
                unit_price: product.price,
            });
        }
        let total = money::to_f64(total);

        let order_rid = RecordId::from_table_key("order", Uuid::new_v4().simple().to_string());
        self.commit_placement(&order_rid, &user_rid, total, &lines)
            .await?;

        self.get_order(&order_rid.to_string()).await
    }

    async fn resolve_product(&self, id: &str) -> Result<Product, AppError> {
        let product = self
            .products()
            .find_by_id(id)
            .await
            .map_err(|e| match e {
                // An unparseable id cannot reference any product
                crate::db::repository::RepoError::Validation(_) => {
                    AppError::not_found(format!("Product {} not found", id))
                }
                other => other.into(),
            })?
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
        Ok(product)
    }

    /// Single-transaction commit: per line a conditional stock decrement
    /// (`WHERE stock >= qty`, THROW when no row matched), then the order
    /// header, then one `order_item` per line. A THROW or storage error
    /// cancels every statement in the transaction.
    ///
    /// A failed transaction reports errors per statement, with the THROW
    /// message on one statement and a generic cancellation notice on the
    /// rest, so every statement error is scanned for the stock marker. A
    /// retryable commit conflict (concurrent placements on the same
    /// products) re-runs the transaction; on the re-run the conditional
    /// update sees the winner's decrement and THROWs normally.
    async fn commit_placement(
        &self,
        order_rid: &RecordId,
        user_rid: &RecordId,
        total: f64,
        lines: &[PricedLine],
    ) -> Result<(), AppError> {
        let mut query = String::from("BEGIN TRANSACTION;\n");
        for (i, _) in lines.iter().enumerate() {
            query.push_str(&format!(
                "LET $upd{i} = (UPDATE $product{i} SET stock -= $qty{i}, updated_at = $now \
                 WHERE stock >= $qty{i} RETURN AFTER);\n\
                 IF array::len($upd{i}) == 0 {{ THROW \"{INSUFFICIENT_STOCK_MARKER} \" + <string>$product{i} }};\n"
            ));
        }
        query.push_str(
            "CREATE $order_id SET user_id = $user, total = $total, status = 'pending', \
             created_at = $now, updated_at = $now;\n",
        );
        for (i, _) in lines.iter().enumerate() {
            query.push_str(&format!(
                "CREATE order_item SET order_id = $order_id, product_id = $product{i}, \
                 quantity = $qty{i}, price = $price{i};\n"
            ));
        }
        query.push_str("COMMIT TRANSACTION;");

        for attempt in 1..=COMMIT_ATTEMPTS {
            let mut request = self
                .db
                .query(query.clone())
                .bind(("order_id", order_rid.clone()))
                .bind(("user", user_rid.clone()))
                .bind(("total", total))
                .bind(("now", now_rfc3339()));
            for (i, line) in lines.iter().enumerate() {
                request = request
                    .bind((format!("product{i}"), line.product_id.clone()))
                    .bind((format!("qty{i}"), line.quantity))
                    .bind((format!("price{i}"), line.unit_price));
            }

            let errors: Vec<String> = match request.await {
                Ok(mut response) => {
                    let errors = response.take_errors();
                    if errors.is_empty() {
                        return Ok(());
                    }
                    errors.into_values().map(|e| e.to_string()).collect()
                }
                Err(e) => vec![e.to_string()],
            };

            if let Some(rest) = errors
                .iter()
                .find_map(|msg| msg.split(INSUFFICIENT_STOCK_MARKER).nth(1))
            {
                // Out of stock at commit time: either the requested lines
                // together exceed stock, or a concurrent placement drained
                // it between pre-check and commit. Everything rolled back.
                let product = rest.trim().trim_matches('"').to_string();
                tracing::info!(product = %product, "Order placement rolled back: insufficient stock");
                return Err(AppError::insufficient_stock(product));
            }

            if attempt < COMMIT_ATTEMPTS && errors.iter().any(|msg| is_commit_conflict(msg)) {
                tracing::debug!(attempt, "Placement hit a commit conflict, retrying");
                continue;
            }

            return Err(AppError::database(format!(
                "Order placement transaction failed: {}",
                errors.join("; ")
            )));
        }
        Err(AppError::database("Order placement retries exhausted"))
    }

    /// All orders, enriched with user and product summaries
    pub async fn list_orders(&self) -> Result<Vec<OrderDetail>, AppError> {
        Ok(self.orders().find_all_detailed().await?)
    }

    /// One order, enriched. `NotFound` for unknown and unparseable ids
    /// alike: a syntactically invalid id cannot reference any order.
    pub async fn get_order(&self, order_id: &str) -> Result<OrderDetail, AppError> {
        self.orders()
            .find_detailed(order_id)
            .await
            .map_err(|e| order_lookup_error(e, order_id))?
            .ok_or_else(|| order_not_found(order_id))
    }

    /// Set an order's status. Targets are `delivered` and `cancelled`;
    /// `pending` is rejected as a no-op target. Transitions between
    /// recognized states are deliberately unrestricted (any-to-any).
    /// Cancellation does not restock.
    pub async fn change_status(&self, order_id: &str, status: &str) -> Result<Order, AppError> {
        let parsed = OrderStatus::parse(status)
            .filter(|s| *s != OrderStatus::Pending)
            .ok_or_else(|| AppError::invalid_status(status))?;

        self.orders()
            .update_status(order_id, parsed)
            .await
            .map_err(|e| order_lookup_error(e, order_id))?
            .ok_or_else(|| order_not_found(order_id))
    }

    /// Delete an order and its line items as one unit
    pub async fn delete_order(&self, order_id: &str) -> Result<(), AppError> {
        self.orders()
            .find_by_id(order_id)
            .await
            .map_err(|e| order_lookup_error(e, order_id))?
            .ok_or_else(|| order_not_found(order_id))?;

        self.orders().delete_with_items(order_id).await?;
        Ok(())
    }
}

fn order_not_found(order_id: &str) -> AppError {
    AppError::not_found(format!("Order {} not found", order_id))
}

fn order_lookup_error(e: crate::db::repository::RepoError, order_id: &str) -> AppError {
    match e {
        // An unparseable id cannot reference any order
        crate::db::repository::RepoError::Validation(_) => order_not_found(order_id),
        other => other.into(),
    }
}

fn validate_items(items: &[LineItemRequest]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::field("products", "products must not be empty"));
    }
    for item in items {
        if item.quantity < 1 {
            return Err(AppError::field("quantity", "quantity must be at least 1"));
        }
        if item.quantity > MAX_QUANTITY {
            return Err(AppError::field(
                "quantity",
                format!("quantity exceeds maximum allowed ({MAX_QUANTITY})"),
            ));
        }
    }
    Ok(())
}

/// Optimistic-commit conflict the storage engine marks as retryable
fn is_commit_conflict(msg: &str) -> bool {
    msg.contains("read or write conflict") || msg.contains("transaction can be retried")
}

fn product_label(product: &Product) -> String {
    match &product.id {
        Some(id) => format!("{} ({})", product.name, id),
        None => product.name.clone(),
    }
}
