//! Product Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Product ID type
pub type ProductId = RecordId;

/// Product model matching the SurrealDB `product` table
///
/// `stock` is the count of sellable units; it is mutated by catalogue
/// management and by the order engine's atomic stock deduction, and must
/// never go negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price, rounded to 2 decimal places
    pub price: f64,
    pub stock: i64,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

/// Create product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
}

/// Update product payload (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_is_active_defaults_to_true() {
        let json = r#"{
            "id": "product:p1",
            "name": "Keyboard",
            "price": 49.99,
            "stock": 10,
            "created_at": "2026-01-01T00:00:00.000Z",
            "updated_at": "2026-01-01T00:00:00.000Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.is_active);
        assert_eq!(product.id.as_ref().unwrap().to_string(), "product:p1");
    }
}
