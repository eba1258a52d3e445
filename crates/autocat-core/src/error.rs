//! Error types module
//!
//! All errors surfaced by the pipeline are unified under [`AppError`].
//! Delete failures are deliberately *not* represented here: asset deletion
//! is best-effort and reported as a boolean so record lifecycle operations
//! are never blocked by asset-store inconsistency.

use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the caller may retry the operation that produced this error.
    /// Uploads and database errors are transient; validation errors are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Upload(_) | AppError::Write(_) | AppError::Database(_)
        )
    }
}
