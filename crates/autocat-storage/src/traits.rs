//! Storage abstraction trait
//!
//! Both asset backends (remote object store, legacy local filesystem)
//! implement [`AssetStore`] so the ingest service and migration runner can
//! work against either without coupling to implementation details.

use async_trait::async_trait;
use autocat_core::{AppError, ImageCategory};
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Empty upload buffer")]
    EmptyUpload,

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Invalid asset path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EmptyUpload => AppError::Validation("Empty file".to_string()),
            StorageError::InvalidPath(msg) => AppError::Validation(msg),
            StorageError::WriteFailed(msg) => AppError::Write(msg),
            StorageError::Io(e) => AppError::Write(e.to_string()),
            StorageError::Config(msg) => AppError::Config(msg),
            other => AppError::Upload(other.to_string()),
        }
    }
}

/// Logical destination for an upload: the category decides the storage
/// folder on both backends; the record id namespaces names for assets owned
/// by a specific catalog record.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub category: ImageCategory,
    pub record_id: Option<Uuid>,
}

impl UploadTarget {
    pub fn new(category: ImageCategory) -> Self {
        UploadTarget {
            category,
            record_id: None,
        }
    }

    pub fn for_record(category: ImageCategory, record_id: Uuid) -> Self {
        UploadTarget {
            category,
            record_id: Some(record_id),
        }
    }
}

/// Storage abstraction trait
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload a buffer under the target's category and return the stored
    /// reference (a remote URL or a root-relative legacy path).
    async fn upload(
        &self,
        data: Vec<u8>,
        original_name: &str,
        target: &UploadTarget,
    ) -> StorageResult<String>;

    /// Delete a previously issued reference. Returns `true` only when the
    /// backend confirmed removal; `false` for references it does not own,
    /// missing assets, or any transient failure. Never errors: cleanup must
    /// not block record lifecycle operations.
    async fn delete(&self, reference: &str) -> bool;

    /// Whether this backend issued the given reference.
    fn owns(&self, reference: &str) -> bool;
}
