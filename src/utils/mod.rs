//! Utility module - shared helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error type and handler result
//! - [`money`] - Decimal arithmetic for prices and totals
//! - [`validation`] - input validation helpers
//! - [`time`] - RFC 3339 timestamp helpers
//! - [`logger`] - tracing setup

pub mod error;
pub mod logger;
pub mod money;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResult};
