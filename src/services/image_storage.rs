//! Product image storage
//!
//! Uploaded images are decoded, re-encoded as JPEG and written under
//! `<public>/images/<product-key>/`. The database stores the path relative
//! to the public directory; the static file route serves it back.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::utils::AppError;

/// Maximum accepted upload size (bytes)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted upload extensions
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG re-encode quality
const JPEG_QUALITY: u8 = 85;

#[derive(Clone)]
pub struct ImageStorage {
    public_dir: PathBuf,
}

impl ImageStorage {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    /// Validate, re-encode and store an uploaded image. `product_key` is the
    /// record key of the owning product (its directory on disk). Returns the
    /// stored path relative to the public directory, e.g.
    /// `images/p1/3f2b….jpg`.
    pub fn save(
        &self,
        product_key: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::field("image", "image file is empty"));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::field(
                "image",
                format!("image exceeds maximum size of {} bytes", MAX_FILE_SIZE),
            ));
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let is_image_mime = mime_guess::from_path(filename)
            .first()
            .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE);
        if !is_image_mime || !SUPPORTED_FORMATS.contains(&extension.as_str()) {
            return Err(AppError::field(
                "image",
                format!(
                    "unsupported image format '{}', expected one of: {}",
                    extension,
                    SUPPORTED_FORMATS.join(", ")
                ),
            ));
        }

        // Decoding also rejects files whose contents do not match the
        // claimed extension
        let decoded = image::load_from_memory(data)
            .map_err(|e| AppError::field("image", format!("invalid image data: {e}")))?;

        let dir = self.public_dir.join("images").join(sanitize_key(product_key));
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::internal(format!("Failed to create image directory: {e}")))?;

        let stored_name = format!("{}.jpg", Uuid::new_v4().simple());
        let dest = dir.join(&stored_name);

        // JPEG has no alpha channel; flatten to RGB before encoding
        let rgb = decoded.to_rgb8();
        let mut encoded = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
        encoder
            .encode_image(&rgb)
            .map_err(|e| AppError::internal(format!("Failed to encode image: {e}")))?;
        std::fs::write(&dest, &encoded)
            .map_err(|e| AppError::internal(format!("Failed to write image file: {e}")))?;

        tracing::info!(
            path = %dest.display(),
            original = filename,
            bytes = encoded.len(),
            "Stored product image"
        );

        Ok(format!("images/{}/{}", sanitize_key(product_key), stored_name))
    }

    /// Remove a stored image by its relative path. Missing files are not an
    /// error: the database row is the source of truth being cleaned up.
    pub fn delete(&self, relative_path: &str) -> Result<(), AppError> {
        let path = self.resolve(relative_path)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Image file already gone");
                Ok(())
            }
            Err(e) => Err(AppError::internal(format!(
                "Failed to delete image file: {e}"
            ))),
        }
    }

    /// Resolve a stored relative path against the public directory,
    /// rejecting traversal components.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, AppError> {
        let rel = Path::new(relative_path);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(AppError::validation("Invalid image path"));
        }
        Ok(self.public_dir.join(rel))
    }
}

/// Keep product directory names to a filesystem-safe charset
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::new(4, 4);
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn save_reencodes_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path());

        let rel = storage.save("p1", "photo.png", &png_bytes()).unwrap();
        assert!(rel.starts_with("images/p1/"));
        assert!(rel.ends_with(".jpg"));

        let on_disk = dir.path().join(&rel);
        assert!(on_disk.exists());
        // Stored bytes must be a decodable JPEG
        let stored = std::fs::read(&on_disk).unwrap();
        assert!(image::load_from_memory(&stored).is_ok());
    }

    #[test]
    fn rejects_unsupported_extension_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path());

        let err = storage.save("p1", "notes.txt", &png_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Fields(_)));

        let err = storage.save("p1", "photo.png", b"not an image").unwrap_err();
        assert!(matches!(err, AppError::Fields(_)));

        let err = storage.save("p1", "photo.png", &[]).unwrap_err();
        assert!(matches!(err, AppError::Fields(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path());

        let rel = storage.save("p1", "photo.png", &png_bytes()).unwrap();
        storage.delete(&rel).unwrap();
        assert!(!dir.path().join(&rel).exists());
        // Second delete: file is already gone, still Ok
        storage.delete(&rel).unwrap();
    }

    #[test]
    fn delete_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path());
        assert!(storage.delete("../outside.jpg").is_err());
        assert!(storage.delete("/etc/passwd").is_err());
    }

    #[test]
    fn product_key_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path());
        let rel = storage.save("p:1", "photo.png", &png_bytes()).unwrap();
        assert!(rel.starts_with("images/p_1/"));
    }
}
