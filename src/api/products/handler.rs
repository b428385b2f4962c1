//! Product Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::{ProductImageRepository, ProductRepository};
use crate::utils::money::validate_price;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::AppResult;

/// Ack envelope for catalogue mutations
#[derive(Debug, Serialize)]
pub struct ProductAck {
    pub status: bool,
    pub message: String,
    pub product: Product,
}

/// GET /api/products
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all().await?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| crate::utils::AppError::not_found(format!("Product {} not found", id)))?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<ProductAck>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_price(payload.price, "price")?;

    let repo = ProductRepository::new(state.get_db());
    let product = repo.create(payload).await?;

    tracing::info!(
        id = %product.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        name = %product.name,
        "Product created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ProductAck {
            status: true,
            message: "Product created successfully".into(),
            product,
        }),
    ))
}

/// PUT /api/products/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductAck>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }

    let repo = ProductRepository::new(state.get_db());
    let product = repo.update(&id, payload).await?;

    Ok(Json(ProductAck {
        status: true,
        message: "Product updated successfully".into(),
        product,
    }))
}

/// PATCH /api/products/:id/status - flip the active flag
pub async fn toggle_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductAck>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo.toggle_status(&id).await?;

    tracing::info!(id = %id, is_active = product.is_active, "Product status toggled");

    Ok(Json(ProductAck {
        status: true,
        message: if product.is_active {
            "Product activated".into()
        } else {
            "Product deactivated".into()
        },
        product,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteAck {
    pub status: bool,
    pub message: String,
}

/// DELETE /api/products/:id
///
/// Also removes the product's image files and records; existing order line
/// items keep their captured prices and render with a bare product id.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteAck>> {
    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| crate::utils::AppError::not_found(format!("Product {} not found", id)))?;

    if let Some(product_rid) = &product.id {
        let images = ProductImageRepository::new(state.get_db());
        let storage = state.image_storage();
        for image in images.find_by_product(product_rid).await? {
            if let Some(image_id) = &image.id {
                images.delete(&image_id.to_string()).await?;
            }
            if let Err(e) = storage.delete(&image.image_path) {
                tracing::warn!(path = %image.image_path, error = %e, "Failed to remove image file");
            }
        }
    }

    repo.delete(&id).await?;
    tracing::info!(id = %id, name = %product.name, "Product deleted");

    Ok(Json(DeleteAck {
        status: true,
        message: "Product deleted successfully".into(),
    }))
}
