//! API route modules
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - login / logout
//! - [`users`] - registration
//! - [`products`] - product catalogue CRUD
//! - [`product_images`] - product image upload and deletion
//! - [`orders`] - order placement and management
//! - [`reports`] - XLSX order report

pub mod auth;
pub mod health;
pub mod orders;
pub mod product_images;
pub mod products;
pub mod reports;
pub mod users;

pub use crate::utils::{AppError, AppResult};
