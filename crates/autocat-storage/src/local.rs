//! Legacy local-filesystem backend.
//!
//! Predates the remote store: assets live under the front-end's static
//! content root and are referenced by root-relative paths
//! (`/images/{folder}/{name}.{ext}`) served by a separate front-end
//! process. Retained for backward compatibility and as the source side of
//! the migration runner; new uploads should go to the remote store.

use crate::traits::{AssetStore, StorageError, StorageResult, UploadTarget};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Root URL segment all legacy references live under.
const IMAGES_SEGMENT: &str = "images";

/// Local filesystem storage under a configured content root.
#[derive(Clone)]
pub struct LocalStore {
    content_root: PathBuf,
}

impl LocalStore {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        LocalStore {
            content_root: content_root.into(),
        }
    }

    /// Resolve a root-relative reference against the content root.
    ///
    /// Rejects anything that is not a plain root-relative path or that
    /// could escape the content root.
    pub fn resolve(&self, reference: &str) -> StorageResult<PathBuf> {
        let relative = reference.strip_prefix('/').ok_or_else(|| {
            StorageError::InvalidPath(format!("not a root-relative path: {}", reference))
        })?;

        if relative.is_empty()
            || Path::new(relative)
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(format!(
                "reference escapes content root: {}",
                reference
            )));
        }

        Ok(self.content_root.join(relative))
    }

    /// Decorate an original filename with a short content-independent hash
    /// so concurrent uploads of the same file never collide.
    fn unique_name(original_name: &str) -> String {
        let path = Path::new(original_name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let ext = path.extension().and_then(|s| s.to_str());

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let digest = Sha256::digest(format!("{}{}", stem, millis).as_bytes());
        let suffix = &hex::encode(digest)[..8];

        match ext {
            Some(ext) => format!("{}-{}.{}", stem, suffix, ext),
            None => format!("{}-{}", stem, suffix),
        }
    }
}

#[async_trait]
impl AssetStore for LocalStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        original_name: &str,
        target: &UploadTarget,
    ) -> StorageResult<String> {
        if data.is_empty() {
            return Err(StorageError::EmptyUpload);
        }

        let folder = target.category.folder();
        let dir = self.content_root.join(IMAGES_SEGMENT).join(folder);
        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let name = Self::unique_name(original_name);
        let path = dir.join(&name);
        let size = data.len();

        fs::write(&path, &data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = size,
            "Local storage upload successful"
        );

        Ok(format!("/{}/{}/{}", IMAGES_SEGMENT, folder, name))
    }

    async fn delete(&self, reference: &str) -> bool {
        let path = match self.resolve(reference) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "Refusing local delete");
                return false;
            }
        };

        if !fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "Local delete: file not present");
            return false;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Local storage delete successful");
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Local delete failed");
                false
            }
        }
    }

    fn owns(&self, reference: &str) -> bool {
        reference.starts_with('/') && !reference.starts_with("//")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocat_core::ImageCategory;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upload_writes_under_category_folder() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let target = UploadTarget::new(ImageCategory::Banner);

        let reference = store
            .upload(b"bytes".to_vec(), "hero.jpg", &target)
            .await
            .unwrap();

        assert!(reference.starts_with("/images/banners/hero-"));
        assert!(reference.ends_with(".jpg"));

        let path = store.resolve(&reference).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn delete_is_true_then_false() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let target = UploadTarget::new(ImageCategory::Partner);

        let reference = store
            .upload(b"logo".to_vec(), "logo.png", &target)
            .await
            .unwrap();

        assert!(store.delete(&reference).await);
        assert!(!store.delete(&reference).await);
    }

    #[tokio::test]
    async fn delete_of_missing_file_is_false() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(!store.delete("/images/banners/never-existed.jpg").await);
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        assert!(store.resolve("/images/../../etc/passwd").is_err());
        assert!(store.resolve("images/banners/a.jpg").is_err());
        assert!(!store.delete("/images/../../etc/passwd").await);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let target = UploadTarget::new(ImageCategory::About);

        let result = store.upload(Vec::new(), "empty.jpg", &target).await;
        assert!(matches!(result, Err(StorageError::EmptyUpload)));
    }

    #[test]
    fn unique_name_decorates_stem_and_keeps_extension() {
        let a = LocalStore::unique_name("photo.jpg");
        assert!(a.starts_with("photo-"));
        assert!(a.ends_with(".jpg"));

        let no_ext = LocalStore::unique_name("photo");
        assert!(no_ext.starts_with("photo-"));
        assert!(!no_ext.contains('.'));
    }
}
