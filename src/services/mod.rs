//! Application services
//!
//! - [`order_service`]: order placement (transactional), status, deletion
//! - [`image_storage`]: product image files on disk
//! - [`report`]: XLSX order report

pub mod image_storage;
pub mod order_service;
pub mod report;

pub use image_storage::ImageStorage;
pub use order_service::{LineItemRequest, OrderService};
pub use report::ReportService;
