//! Autocat Migration Library
//!
//! One-shot batch job moving legacy local-disk assets to the remote store:
//! read, compress, upload, rewrite the record's reference, remove the local
//! source. Per-item outcomes are collected into a report; a failure never
//! aborts the batch, and re-runs are idempotent because already-remote
//! references are skipped up front.

pub mod cleanup;
pub mod runner;

pub use cleanup::{remaining_legacy_references, CleanupReport, CleanupRunner};
pub use runner::{MigrationItem, MigrationOutcome, MigrationReport, MigrationRunner};

/// Initialize tracing for the migration binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
