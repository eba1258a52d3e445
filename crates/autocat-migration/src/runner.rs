//! Migration runner: legacy local assets to the remote store.

use autocat_core::AppError;
use autocat_db::{AssetRecord, AssetRecordSource};
use autocat_processing::{CompressionPolicy, ImageCompressor};
use autocat_storage::{AssetStore, LocalStore, UploadTarget};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Terminal state of one asset reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum MigrationOutcome {
    Migrated { url: String },
    SkippedAlreadyRemote,
    FailedSourceMissing,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationItem {
    pub id: Uuid,
    pub reference: String,
    #[serde(flatten)]
    pub outcome: MigrationOutcome,
}

/// Aggregate result of one run over one record source.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub source: String,
    pub migrated: usize,
    pub skipped: usize,
    pub missing: usize,
    pub failed: usize,
    pub items: Vec<MigrationItem>,
}

impl MigrationReport {
    fn new(source: &str) -> Self {
        MigrationReport {
            source: source.to_string(),
            migrated: 0,
            skipped: 0,
            missing: 0,
            failed: 0,
            items: Vec::new(),
        }
    }

    fn push(&mut self, record: &AssetRecord, outcome: MigrationOutcome) {
        match outcome {
            MigrationOutcome::Migrated { .. } => self.migrated += 1,
            MigrationOutcome::SkippedAlreadyRemote => self.skipped += 1,
            MigrationOutcome::FailedSourceMissing => self.missing += 1,
            MigrationOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(MigrationItem {
            id: record.id,
            reference: record.reference.clone(),
            outcome,
        });
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} migrated, {} skipped (already remote), {} failed (source missing), {} failed",
            self.source, self.migrated, self.skipped, self.missing, self.failed
        )
    }
}

/// Sequential, one-shot migration over a record source. Each record is fully
/// processed (including cleanup) before the next begins, so a crash mid-run
/// leaves at most one record half-migrated, and that record is picked up
/// cleanly on re-run.
pub struct MigrationRunner {
    remote: Arc<dyn AssetStore>,
    local: LocalStore,
    policy: CompressionPolicy,
}

impl MigrationRunner {
    pub fn new(remote: Arc<dyn AssetStore>, local: LocalStore, policy: CompressionPolicy) -> Self {
        MigrationRunner {
            remote,
            local,
            policy,
        }
    }

    /// Migrate every record of `source` holding a legacy reference. With
    /// `dry_run`, records are classified and checked but nothing is
    /// transferred, rewritten, or deleted.
    pub async fn run(
        &self,
        source: &dyn AssetRecordSource,
        dry_run: bool,
    ) -> Result<MigrationReport, AppError> {
        let records = source.list_with_assets().await?;
        let mut report = MigrationReport::new(source.name());

        tracing::info!(
            source = source.name(),
            count = records.len(),
            dry_run = dry_run,
            "Starting migration"
        );

        for record in &records {
            let outcome = self.migrate_one(source, record, dry_run).await;
            match &outcome {
                MigrationOutcome::Migrated { url } => {
                    tracing::info!(id = %record.id, url = %url, "Migrated")
                }
                MigrationOutcome::SkippedAlreadyRemote => {
                    tracing::debug!(id = %record.id, "Skipping, already remote")
                }
                MigrationOutcome::FailedSourceMissing => {
                    tracing::warn!(id = %record.id, reference = %record.reference, "Source file missing")
                }
                MigrationOutcome::Failed { reason } => {
                    tracing::error!(id = %record.id, reason = %reason, "Migration failed")
                }
            }
            report.push(record, outcome);
        }

        tracing::info!(source = source.name(), report = %report, "Migration finished");
        Ok(report)
    }

    async fn migrate_one(
        &self,
        source: &dyn AssetRecordSource,
        record: &AssetRecord,
        dry_run: bool,
    ) -> MigrationOutcome {
        if self.remote.owns(&record.reference) {
            return MigrationOutcome::SkippedAlreadyRemote;
        }

        let path = match self.local.resolve(&record.reference) {
            Ok(path) => path,
            Err(e) => {
                return MigrationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return MigrationOutcome::FailedSourceMissing;
        }

        if dry_run {
            return MigrationOutcome::Migrated {
                url: record.reference.clone(),
            };
        }

        match self.transfer(source, record, &path).await {
            Ok(url) => MigrationOutcome::Migrated { url },
            Err(e) => {
                if e.is_recoverable() {
                    tracing::warn!(id = %record.id, "Transient transfer failure, a re-run may succeed");
                }
                MigrationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Read, compress, upload, persist, then clean up the local source.
    /// A cleanup failure after the record persisted still counts as
    /// migrated; the orphaned file is harmless and a re-run skips the
    /// now-remote reference.
    async fn transfer(
        &self,
        source: &dyn AssetRecordSource,
        record: &AssetRecord,
        path: &std::path::Path,
    ) -> Result<String, AppError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Write(format!("Failed to read {}: {}", path.display(), e)))?;

        let compressed = ImageCompressor::compress_to_limit(&data, &self.policy)
            .map_err(|e| AppError::ImageProcessing(e.to_string()))?;

        let original_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("asset");
        let target = UploadTarget::for_record(record.category.clone(), record.id);

        let url = self
            .remote
            .upload(compressed.to_vec(), original_name, &target)
            .await?;

        source.update_reference(record.id, &url).await?;

        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Could not remove migrated local file");
        }

        Ok(url)
    }
}
