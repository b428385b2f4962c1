//! Product Repository
//!
//! The Product Catalog Accessor: CRUD plus the conditional stock adjustment
//! the order engine builds its transaction around.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::utils::money;
use crate::utils::time::now_rfc3339;

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products (active and inactive)
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing = parse_record_id(id)?;
        let product: Option<Product> = self.base.db().select(thing).await?;
        Ok(product)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.stock < 0 {
            return Err(RepoError::Validation("stock must be non-negative".into()));
        }

        let now = now_rfc3339();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product SET
                    name = $name,
                    description = $description,
                    price = $price,
                    stock = $stock,
                    is_active = true,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("description", data.description))
            // Stored prices are two decimal places; order totals sum them
            .bind(("price", money::to_f64(money::to_decimal(data.price))))
            .bind(("stock", data.stock))
            .bind(("now", now))
            .await?;

        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product (partial: only supplied fields change)
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing = parse_record_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        if let Some(stock) = data.stock
            && stock < 0
        {
            return Err(RepoError::Validation("stock must be non-negative".into()));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $id SET
                    name = $name,
                    description = $description,
                    price = $price,
                    stock = $stock,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("id", thing))
            .bind(("name", data.name.unwrap_or(existing.name)))
            .bind(("description", data.description.or(existing.description)))
            .bind((
                "price",
                money::to_f64(money::to_decimal(data.price.unwrap_or(existing.price))),
            ))
            .bind(("stock", data.stock.unwrap_or(existing.stock)))
            .bind(("now", now_rfc3339()))
            .await?;

        let updated: Option<Product> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update product".to_string()))
    }

    /// Flip the active/inactive flag
    pub async fn toggle_status(&self, id: &str) -> RepoResult<Product> {
        let thing = parse_record_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET is_active = !is_active, updated_at = $now RETURN AFTER")
            .bind(("id", thing))
            .bind(("now", now_rfc3339()))
            .await?;

        let updated: Option<Product> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Adjust stock by `delta` (negative to deduct) as a single conditional
    /// update. Returns `None` when the guard `stock + delta >= 0` fails, so
    /// stock can never go negative. The order engine inlines this same
    /// statement into its placement transaction.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> RepoResult<Option<Product>> {
        let thing = parse_record_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $id SET stock += $delta, updated_at = $now
                   WHERE stock + $delta >= 0
                   RETURN AFTER"#,
            )
            .bind(("id", thing))
            .bind(("delta", delta))
            .bind(("now", now_rfc3339()))
            .await?;

        let updated: Option<Product> = result.take(0)?;
        Ok(updated)
    }

    /// Delete a product permanently
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        let deleted: Option<Product> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
