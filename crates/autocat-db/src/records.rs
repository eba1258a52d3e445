//! Record-source seam between repositories and the migration runner.
//!
//! Each repository that owns an asset-bearing table exposes itself as an
//! [`AssetRecordSource`]: enumerate records with a non-empty reference, and
//! rewrite one reference after a successful transfer. The migration runner
//! only ever sees this trait, which keeps it testable against in-memory
//! sources.

use async_trait::async_trait;
use autocat_core::{AppError, ImageCategory};
use uuid::Uuid;

/// One asset-bearing record, flattened to what the pipeline needs.
#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub id: Uuid,
    pub category: ImageCategory,
    /// The stored asset reference (remote URL or legacy path).
    pub reference: String,
}

#[async_trait]
pub trait AssetRecordSource: Send + Sync {
    /// Human-readable source name for logs and reports (the table name).
    fn name(&self) -> &'static str;

    /// All records whose asset reference is non-empty.
    async fn list_with_assets(&self) -> Result<Vec<AssetRecord>, AppError>;

    /// Overwrite the stored reference for one record.
    async fn update_reference(&self, id: Uuid, url: &str) -> Result<(), AppError>;
}
