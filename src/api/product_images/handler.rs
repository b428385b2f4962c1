//! Product Image Handlers
//!
//! Upload is multipart: an `image` file part plus `product_id` and an
//! optional `is_main` flag. Marking an image as main clears the flag on the
//! product's other images first, so at most one main image exists.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::ProductImage;
use crate::db::repository::{ProductImageRepository, ProductRepository};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct ImageAck {
    pub status: bool,
    pub message: String,
    pub image: ProductImage,
    /// Serving URL under the static file route
    pub url: String,
}

struct UploadForm {
    product_id: Option<String>,
    is_main: bool,
    filename: Option<String>,
    data: Option<Vec<u8>>,
}

async fn read_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm {
        product_id: None,
        is_main: false,
        filename: None,
        data: None,
    };

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("image") => {
                form.filename = field.file_name().map(|f| f.to_string());
                form.data = Some(field.bytes().await?.to_vec());
            }
            Some("product_id") => {
                form.product_id = Some(field.text().await?);
            }
            Some("is_main") => {
                let value = field.text().await?;
                form.is_main = matches!(value.as_str(), "true" | "1");
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/products/images
pub async fn upload(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ImageAck>)> {
    let form = read_form(multipart).await?;

    let product_id = form
        .product_id
        .ok_or_else(|| AppError::field("product_id", "product_id is required"))?;
    let data = form
        .data
        .ok_or_else(|| AppError::field("image", "image file is required"))?;
    let filename = form
        .filename
        .ok_or_else(|| AppError::field("image", "image filename is missing"))?;

    let products = ProductRepository::new(state.get_db());
    let product = products
        .find_by_id(&product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", product_id)))?;
    let product_rid = product
        .id
        .ok_or_else(|| AppError::internal("Product record without id"))?;

    let storage = state.image_storage();
    let image_path = storage.save(&product_rid.key().to_string(), &filename, &data)?;

    let images = ProductImageRepository::new(state.get_db());
    if form.is_main {
        images.clear_main(&product_rid).await?;
    }
    let image = match images.create(product_rid, image_path.clone(), form.is_main).await {
        Ok(image) => image,
        Err(e) => {
            // The record failed, so the file on disk is an orphan
            if let Err(cleanup) = storage.delete(&image_path) {
                tracing::warn!(path = %image_path, error = %cleanup, "Failed to clean up orphaned image file");
            }
            return Err(e.into());
        }
    };

    tracing::info!(product_id = %product_id, path = %image_path, is_main = form.is_main, "Product image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(ImageAck {
            status: true,
            message: "Image uploaded successfully".into(),
            url: format!("/files/{image_path}"),
            image,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct DeleteAck {
    pub status: bool,
    pub message: String,
}

/// DELETE /api/products/images/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteAck>> {
    let images = ProductImageRepository::new(state.get_db());
    let image = images
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Image {} not found", id)))?;

    images.delete(&id).await?;
    if let Err(e) = state.image_storage().delete(&image.image_path) {
        tracing::warn!(path = %image.image_path, error = %e, "Failed to remove image file");
    }

    tracing::info!(id = %id, path = %image.image_path, "Product image deleted");

    Ok(Json(DeleteAck {
        status: true,
        message: "Image deleted successfully".into(),
    }))
}
