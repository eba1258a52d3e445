//! Image ingest service.
//!
//! The single write path for binary assets: handlers hand over a raw
//! multipart buffer plus a target, and get back the stored URL. Upload
//! happens before any record is persisted, so an upload failure leaves
//! prior state untouched; replacement deletes the old asset only after the
//! new one is safely stored.

use autocat_core::AppError;
use autocat_processing::{CompressError, CompressionPolicy, ImageCompressor};
use autocat_storage::{AssetRouter, AssetStore, UploadTarget};
use std::sync::Arc;

pub struct IngestService {
    remote: Arc<dyn AssetStore>,
    router: AssetRouter,
    policy: CompressionPolicy,
}

impl IngestService {
    pub fn new(remote: Arc<dyn AssetStore>, router: AssetRouter, policy: CompressionPolicy) -> Self {
        IngestService {
            remote,
            router,
            policy,
        }
    }

    /// Validate, compress toward the remote ceiling, and upload. Returns the
    /// stored URL to persist on the owning record.
    pub async fn upload_image(
        &self,
        data: Vec<u8>,
        original_name: &str,
        target: &UploadTarget,
    ) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::Validation("Empty file".to_string()));
        }
        if image::guess_format(&data).is_err() {
            return Err(AppError::Validation(format!(
                "'{}' is not a supported image format",
                original_name
            )));
        }

        let compressed = ImageCompressor::compress_to_limit(&data, &self.policy)
            .map_err(|e| match e {
                CompressError::Decode(err) => {
                    AppError::Validation(format!("Unreadable image: {}", err))
                }
                CompressError::Encode(msg) => AppError::ImageProcessing(msg),
            })?;

        let url = self
            .remote
            .upload(compressed.to_vec(), original_name, target)
            .await?;

        tracing::info!(
            category = %target.category.as_str(),
            original_bytes = data.len(),
            stored_url = %url,
            "Image ingested"
        );

        Ok(url)
    }

    /// Upload a replacement asset, then best-effort delete of the old one.
    /// The old reference is only touched once the new upload has succeeded.
    pub async fn replace_image(
        &self,
        old_reference: &str,
        data: Vec<u8>,
        original_name: &str,
        target: &UploadTarget,
    ) -> Result<String, AppError> {
        let url = self.upload_image(data, original_name, target).await?;

        if !old_reference.is_empty() && !self.router.delete(old_reference).await {
            tracing::warn!(
                reference = %old_reference,
                "Replaced asset could not be cleaned up"
            );
        }

        Ok(url)
    }

    /// Best-effort delete of a stored reference. Never errors.
    pub async fn delete_image(&self, reference: &str) -> bool {
        self.router.delete(reference).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use autocat_core::config::RemoteStoreConfig;
    use autocat_core::ImageCategory;
    use autocat_storage::{LocalStore, RemoteStore, StorageResult};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Remote stand-in that records uploads instead of hitting the network.
    struct RecordingStore {
        uploads: Mutex<Vec<(usize, String)>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            RecordingStore {
                uploads: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AssetStore for RecordingStore {
        async fn upload(
            &self,
            data: Vec<u8>,
            original_name: &str,
            target: &UploadTarget,
        ) -> StorageResult<String> {
            let url = format!(
                "https://res.cloudinary.com/test/image/upload/v1/{}/{}",
                target.category.folder(),
                original_name
            );
            self.uploads.lock().unwrap().push((data.len(), url.clone()));
            Ok(url)
        }

        async fn delete(&self, _reference: &str) -> bool {
            false
        }

        fn owns(&self, reference: &str) -> bool {
            reference.contains("res.cloudinary.com")
        }
    }

    fn test_router(content_root: &std::path::Path) -> AssetRouter {
        let remote = Arc::new(
            RemoteStore::new(RemoteStoreConfig {
                cloud_name: "test".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
                upload_ceiling_bytes: 9 * 1024 * 1024,
            })
            .unwrap(),
        );
        AssetRouter::new(remote, Arc::new(LocalStore::new(content_root)))
    }

    fn service(content_root: &std::path::Path) -> (IngestService, Arc<RecordingStore>) {
        let remote = Arc::new(RecordingStore::new());
        let service = IngestService::new(
            remote.clone(),
            test_router(content_root),
            CompressionPolicy::for_target(64 * 1024),
        );
        (service, remote)
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        });
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[tokio::test]
    async fn upload_compresses_and_returns_remote_url() {
        let dir = tempdir().unwrap();
        let (service, remote) = service(dir.path());
        let target = UploadTarget::new(ImageCategory::Banner);

        let data = png_bytes(1200, 800);
        let url = service
            .upload_image(data.clone(), "hero.png", &target)
            .await
            .unwrap();

        assert!(url.contains("res.cloudinary.com"));
        let uploads = remote.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        // Oversized input was pushed through the ladder before upload.
        assert!(uploads[0].0 <= 64 * 1024);
    }

    #[tokio::test]
    async fn small_upload_is_passed_through_unchanged() {
        let dir = tempdir().unwrap();
        let (service, remote) = service(dir.path());
        let target = UploadTarget::new(ImageCategory::Partner);

        let data = png_bytes(32, 32);
        service
            .upload_image(data.clone(), "logo.png", &target)
            .await
            .unwrap();

        let uploads = remote.uploads.lock().unwrap();
        assert_eq!(uploads[0].0, data.len());
    }

    #[tokio::test]
    async fn empty_and_non_image_uploads_are_validation_errors() {
        let dir = tempdir().unwrap();
        let (service, _) = service(dir.path());
        let target = UploadTarget::new(ImageCategory::About);

        let err = service
            .upload_image(Vec::new(), "a.png", &target)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .upload_image(b"plain text".to_vec(), "a.txt", &target)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn replace_uploads_new_then_removes_old_legacy_asset() {
        let dir = tempdir().unwrap();
        let (service, _) = service(dir.path());
        let target = UploadTarget::new(ImageCategory::Banner);

        // Seed a legacy asset through the local store directly.
        let local = LocalStore::new(dir.path());
        let old = local
            .upload(b"old".to_vec(), "old.jpg", &target)
            .await
            .unwrap();
        let old_path = local.resolve(&old).unwrap();
        assert!(old_path.exists());

        let url = service
            .replace_image(&old, png_bytes(64, 64), "new.png", &target)
            .await
            .unwrap();

        assert!(url.contains("res.cloudinary.com"));
        assert!(!old_path.exists());
    }

    #[tokio::test]
    async fn delete_of_unrecognized_reference_is_false() {
        let dir = tempdir().unwrap();
        let (service, _) = service(dir.path());
        assert!(!service.delete_image("https://example.com/a.jpg").await);
    }
}
