//! Asset router: decides which backend owns a stored reference.
//!
//! References carry no stored discriminator; ownership is decided by URL
//! shape. That classification is fragile by nature, so it lives in exactly
//! one function ([`classify`]) and produces an explicit tagged value rather
//! than being re-sniffed at every call site.

use crate::local::LocalStore;
use crate::remote::{RemoteStore, REMOTE_HOST_MARKER};
use crate::traits::AssetStore;
use std::sync::Arc;

/// Classified asset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    /// Fully-qualified URL issued by the remote store.
    Remote { url: String },
    /// Root-relative path under the legacy content root.
    Legacy { path: String },
}

/// Classify a stored reference. Returns `None` for anything neither backend
/// could have issued (malformed, foreign host, empty).
pub fn classify(reference: &str) -> Option<AssetRef> {
    if reference.contains(REMOTE_HOST_MARKER) {
        return Some(AssetRef::Remote {
            url: reference.to_string(),
        });
    }
    if reference.starts_with('/') && !reference.starts_with("//") {
        return Some(AssetRef::Legacy {
            path: reference.to_string(),
        });
    }
    None
}

/// Dispatches delete/ownership checks to the backend that issued a
/// reference. Never errors: record deletion must proceed regardless of
/// orphaned-asset cleanup.
#[derive(Clone)]
pub struct AssetRouter {
    remote: Arc<RemoteStore>,
    local: Arc<LocalStore>,
}

impl AssetRouter {
    pub fn new(remote: Arc<RemoteStore>, local: Arc<LocalStore>) -> Self {
        AssetRouter { remote, local }
    }

    /// Delete a reference on whichever backend owns it. Unrecognized or
    /// malformed references are a no-op returning `false`.
    pub async fn delete(&self, reference: &str) -> bool {
        match classify(reference) {
            Some(AssetRef::Remote { url }) => self.remote.delete(&url).await,
            Some(AssetRef::Legacy { path }) => self.local.delete(&path).await,
            None => {
                tracing::debug!(reference = %reference, "Unrecognized asset reference, skipping delete");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocat_core::config::RemoteStoreConfig;
    use tempfile::tempdir;

    #[test]
    fn classify_remote_by_host_marker() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1/banners/a.jpg";
        assert_eq!(
            classify(url),
            Some(AssetRef::Remote {
                url: url.to_string()
            })
        );
    }

    #[test]
    fn classify_legacy_by_root_relative_path() {
        assert_eq!(
            classify("/images/banners/a.jpg"),
            Some(AssetRef::Legacy {
                path: "/images/banners/a.jpg".to_string()
            })
        );
    }

    #[test]
    fn classify_rejects_foreign_and_malformed() {
        assert_eq!(classify("https://example.com/a.jpg"), None);
        assert_eq!(classify("images/banners/a.jpg"), None);
        assert_eq!(classify("//example.com/a.jpg"), None);
        assert_eq!(classify(""), None);
    }

    #[tokio::test]
    async fn unrecognized_reference_delete_is_a_noop() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(
            RemoteStore::new(RemoteStoreConfig {
                cloud_name: "demo".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
                upload_ceiling_bytes: 9 * 1024 * 1024,
            })
            .unwrap(),
        );
        let local = Arc::new(LocalStore::new(dir.path()));
        let router = AssetRouter::new(remote, local);

        assert!(!router.delete("https://example.com/a.jpg").await);
        assert!(!router.delete("").await);
    }

    #[tokio::test]
    async fn legacy_delete_routes_to_local_store() {
        use crate::traits::UploadTarget;
        use autocat_core::ImageCategory;

        let dir = tempdir().unwrap();
        let remote = Arc::new(
            RemoteStore::new(RemoteStoreConfig {
                cloud_name: "demo".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
                upload_ceiling_bytes: 9 * 1024 * 1024,
            })
            .unwrap(),
        );
        let local = Arc::new(LocalStore::new(dir.path()));

        let reference = local
            .upload(
                b"banner".to_vec(),
                "hero.jpg",
                &UploadTarget::new(ImageCategory::Banner),
            )
            .await
            .unwrap();

        let router = AssetRouter::new(remote, local);
        assert!(router.delete(&reference).await);
        assert!(!router.delete(&reference).await);
    }
}
