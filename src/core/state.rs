use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtConfig, JwtService};
use crate::core::Config;
use crate::db::DbService;
use crate::services::{ImageStorage, OrderService, ReportService};
use crate::utils::AppError;

/// Shared application state handed to every handler
///
/// Cloning is cheap: the database handle and the JWT service are shared
/// references.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT token service (shared, holds the revocation list)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, db: Surreal<Db>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            db,
            jwt_service,
        }
    }

    /// Initialize the state for a real server run:
    ///
    /// 1. work directory layout (database/, logs/, public/)
    /// 2. embedded database at `work_dir/database/store.db`
    /// 3. JWT service from the config
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("store.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

        Ok(Self::new(config.clone(), db_service.db, jwt_service))
    }

    /// In-memory variant for tests: throwaway database, work dir pointed at
    /// the given path
    pub async fn initialize_in_memory(work_dir: &str) -> Result<Self, AppError> {
        let config = Config::with_overrides(work_dir, 0);
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_service = DbService::new_in_memory().await?;
        let jwt_service = Arc::new(JwtService::new(JwtConfig {
            secret: "in-memory-test-secret-0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "store-api".to_string(),
            audience: "store-clients".to_string(),
        }));

        Ok(Self::new(config, db_service.db, jwt_service))
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    pub fn public_dir(&self) -> PathBuf {
        self.config.public_dir()
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.db.clone())
    }

    pub fn image_storage(&self) -> ImageStorage {
        ImageStorage::new(self.public_dir())
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(self.db.clone(), self.public_dir())
    }
}
