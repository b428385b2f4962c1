//! Product Image Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// ProductImage ID type
pub type ProductImageId = RecordId;

/// Product image record: metadata for a file stored under the public dir.
///
/// At most one image per product carries `is_main = true`; flagging a new
/// main image clears the flag on the product's other images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductImageId>,
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    /// Path relative to the public dir, e.g. `images/p1/<uuid>.jpg`
    pub image_path: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_main: bool,
    pub created_at: String,
}
