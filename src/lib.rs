//! Store API - e-commerce backend
//!
//! # Overview
//!
//! REST backend with an embedded SurrealDB store:
//!
//! - **Users & auth** (`auth`, `api/users`, `api/auth`): registration,
//!   login, JWT bearer tokens with logout revocation
//! - **Catalogue** (`api/products`, `api/product_images`): product CRUD
//!   plus image attachments served from the public file tree
//! - **Orders** (`services/order_service`, `api/orders`): transactional
//!   placement with atomic stock deduction, status lifecycle, deletion
//! - **Reports** (`services/report`, `api/reports`): date-ranged XLSX
//!   order report
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT, middleware, current user
//! ├── db/            # models and repositories (SurrealDB)
//! ├── services/      # order engine, image storage, report builder
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging, money, validation, time
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: `.env`, work directory layout, logging
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config
        .ensure_work_dir_structure()
        .map_err(|e| anyhow::anyhow!("failed to create work directory layout: {e}"))?;

    let log_dir = config.logs_dir();
    let level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(level.as_deref(), log_dir.to_str());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                     ___    ____  ____
  / ___// /_____  ________     /   |  / __ \/  _/
  \__ \/ __/ __ \/ ___/ _ \   / /| | / /_/ // /
 ___/ / /_/ /_/ / /  /  __/  / ___ |/ ____// /
/____/\__/\____/_/   \___/  /_/  |_/_/   /___/
    "#
    );
}
