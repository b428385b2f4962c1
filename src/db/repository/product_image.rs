//! Product Image Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::ProductImage;
use crate::utils::time::now_rfc3339;

#[derive(Clone)]
pub struct ProductImageRepository {
    base: BaseRepository,
}

impl ProductImageRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find image by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ProductImage>> {
        let thing = parse_record_id(id)?;
        let image: Option<ProductImage> = self.base.db().select(thing).await?;
        Ok(image)
    }

    /// All images attached to a product
    pub async fn find_by_product(&self, product_id: &RecordId) -> RepoResult<Vec<ProductImage>> {
        let images: Vec<ProductImage> = self
            .base
            .db()
            .query("SELECT * FROM product_image WHERE product_id = $product ORDER BY created_at")
            .bind(("product", product_id.clone()))
            .await?
            .take(0)?;
        Ok(images)
    }

    /// Clear the main flag on every image of a product. Called before
    /// storing a new main image so at most one main image exists.
    pub async fn clear_main(&self, product_id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE product_image SET is_main = false WHERE product_id = $product")
            .bind(("product", product_id.clone()))
            .await?
            .check()?;
        Ok(())
    }

    /// Record a stored image file
    pub async fn create(
        &self,
        product_id: RecordId,
        image_path: String,
        is_main: bool,
    ) -> RepoResult<ProductImage> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product_image SET
                    product_id = $product,
                    image_path = $image_path,
                    is_main = $is_main,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("product", product_id))
            .bind(("image_path", image_path))
            .bind(("is_main", is_main))
            .bind(("now", now_rfc3339()))
            .await?;

        let created: Option<ProductImage> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product image".to_string()))
    }

    /// Delete an image record
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        let deleted: Option<ProductImage> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::ProductCreate;
    use crate::db::repository::ProductRepository;

    async fn setup() -> (ProductImageRepository, RecordId) {
        let service = DbService::new_in_memory().await.unwrap();
        let products = ProductRepository::new(service.db.clone());
        let product = products
            .create(ProductCreate {
                name: "Mug".into(),
                description: None,
                price: 9.5,
                stock: 3,
            })
            .await
            .unwrap();
        (
            ProductImageRepository::new(service.db),
            product.id.unwrap(),
        )
    }

    #[tokio::test]
    async fn only_one_main_image() {
        let (repo, product_id) = setup().await;

        let first = repo
            .create(product_id.clone(), "images/p/a.jpg".into(), true)
            .await
            .unwrap();
        assert!(first.is_main);

        repo.clear_main(&product_id).await.unwrap();
        repo.create(product_id.clone(), "images/p/b.jpg".into(), true)
            .await
            .unwrap();

        let images = repo.find_by_product(&product_id).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images.iter().filter(|i| i.is_main).count(), 1);
        assert_eq!(
            images.iter().find(|i| i.is_main).unwrap().image_path,
            "images/p/b.jpg"
        );
    }

    #[tokio::test]
    async fn delete_image_record() {
        let (repo, product_id) = setup().await;
        let image = repo
            .create(product_id, "images/p/a.jpg".into(), false)
            .await
            .unwrap();
        let id = image.id.unwrap().to_string();

        assert!(repo.delete(&id).await.unwrap());
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }
}
