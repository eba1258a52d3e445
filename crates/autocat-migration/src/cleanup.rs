//! Post-migration sweep of the legacy images tree.
//!
//! Migrated records point at the remote store, but the legacy files stay on
//! disk when their removal fails mid-transfer, and nothing in the normal
//! pipeline ever touches them again. This sweep reclaims that space: it
//! deletes every file under `<content_root>/images` and removes the emptied
//! subdirectories, keeping the root itself for the front-end.
//!
//! Destructive by nature, so it is gated: callers must verify via
//! [`remaining_legacy_references`] that no record still points into the
//! legacy tree before running it.

use autocat_core::AppError;
use autocat_db::AssetRecordSource;
use autocat_storage::{classify, AssetRef};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Count records across all sources whose reference still resolves to the
/// legacy local backend. A sweep is only safe when this is zero.
pub async fn remaining_legacy_references(
    sources: &[Box<dyn AssetRecordSource>],
) -> Result<usize, AppError> {
    let mut remaining = 0;
    for source in sources {
        for record in source.list_with_assets().await? {
            if matches!(classify(&record.reference), Some(AssetRef::Legacy { .. })) {
                remaining += 1;
            }
        }
    }
    Ok(remaining)
}

/// Aggregate result of one sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub deleted_files: usize,
    pub removed_dirs: usize,
    pub freed_bytes: u64,
    pub failed: usize,
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cleanup: {} files deleted ({} bytes freed), {} empty directories removed, {} failed",
            self.deleted_files, self.freed_bytes, self.removed_dirs, self.failed
        )
    }
}

/// One-shot recursive sweep under the legacy images root. Per-file failures
/// are counted and logged, never aborting the run.
pub struct CleanupRunner {
    images_root: PathBuf,
}

impl CleanupRunner {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        CleanupRunner {
            images_root: content_root.into().join("images"),
        }
    }

    /// Delete every file under the images root, then remove emptied
    /// subdirectories deepest-first. With `dry_run`, counts what would be
    /// deleted without touching anything.
    pub async fn run(&self, dry_run: bool) -> Result<CleanupReport, AppError> {
        let mut report = CleanupReport::default();

        if !tokio::fs::try_exists(&self.images_root).await.unwrap_or(false) {
            tracing::info!(root = %self.images_root.display(), "Images root not present, nothing to sweep");
            return Ok(report);
        }

        let mut dirs = Vec::new();
        let mut pending = vec![self.images_root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
                AppError::Write(format!("Failed to read directory {}: {}", dir.display(), e))
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                AppError::Write(format!("Failed to read directory {}: {}", dir.display(), e))
            })? {
                let path = entry.path();
                let metadata = match entry.metadata().await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Could not stat entry");
                        report.failed += 1;
                        continue;
                    }
                };

                if metadata.is_dir() {
                    dirs.push(path.clone());
                    pending.push(path);
                    continue;
                }

                if dry_run {
                    report.deleted_files += 1;
                    report.freed_bytes += metadata.len();
                    continue;
                }

                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {
                        tracing::debug!(path = %path.display(), size_bytes = metadata.len(), "Deleted legacy file");
                        report.deleted_files += 1;
                        report.freed_bytes += metadata.len();
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Could not delete legacy file");
                        report.failed += 1;
                    }
                }
            }
        }

        if !dry_run {
            // Deepest directories first so parents empty out as children go.
            dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
            for dir in dirs {
                if tokio::fs::remove_dir(&dir).await.is_ok() {
                    tracing::debug!(path = %dir.display(), "Removed empty directory");
                    report.removed_dirs += 1;
                }
            }
        }

        tracing::info!(report = %report, "Sweep finished");
        Ok(report)
    }
}
