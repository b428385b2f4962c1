//! Database Module
//!
//! Embedded SurrealDB storage: RocksDB-backed on disk in production, the
//! in-memory engine in tests.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "store";
const DATABASE: &str = "store";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone, Debug)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::prepare(db).await
    }

    /// In-memory database for tests and demos
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready (ns={NAMESPACE}, db={DATABASE})");
        Ok(Self { db })
    }
}

/// Idempotent schema definitions. Tables stay schemaless; only the
/// constraints the application relies on are declared.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS order_item_order ON TABLE order_item COLUMNS order_id;
        DEFINE INDEX IF NOT EXISTS product_image_product ON TABLE product_image COLUMNS product_id;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

    Ok(())
}
