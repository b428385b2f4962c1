//! Database models
//!
//! One module per SurrealDB table, plus shared serde helpers for record IDs.

pub mod serde_helpers;

pub mod order;
pub mod product;
pub mod product_image;
pub mod user;

pub use order::{
    Order, OrderDetail, OrderId, OrderItemDetail, OrderLineItem, OrderReportRow, OrderStatus,
    OrderUser, ProductSummary,
};
pub use product::{Product, ProductCreate, ProductId, ProductUpdate};
pub use product_image::{ProductImage, ProductImageId};
pub use user::{User, UserCreate, UserId, UserPublic};
