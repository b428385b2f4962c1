//! Repository Module
//!
//! CRUD access to the SurrealDB tables. Repositories are thin: each wraps
//! the shared [`BaseRepository`] and exposes table-specific queries. The
//! multi-entity order placement transaction lives in the order service, not
//! here — repositories only contribute the single-statement building blocks.

pub mod order;
pub mod product;
pub mod product_image;
pub mod user;

pub use order::OrderRepository;
pub use product::ProductRepository;
pub use product_image::ProductImageRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        use crate::utils::AppError;
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Shared database handle for repositories
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Parse an API-supplied "table:id" string into a RecordId
pub fn parse_record_id(id: &str) -> RepoResult<surrealdb::RecordId> {
    id.parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
}
