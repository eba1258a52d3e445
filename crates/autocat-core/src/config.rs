//! Configuration module
//!
//! Environment-driven configuration for the asset pipeline. Built once at
//! process start via [`Config::from_env`] and passed by reference to every
//! component that uploads or deletes; nothing reads the environment after
//! startup.

use std::env;

use crate::error::AppError;

/// Default size ceiling for remote uploads: 9 MB, just under the remote
/// store's 10 MB free-tier limit.
pub const DEFAULT_UPLOAD_CEILING_BYTES: usize = 9 * 1024 * 1024;

/// Credentials and limits for the remote asset store.
#[derive(Clone, Debug)]
pub struct RemoteStoreConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Uploads larger than this are pushed through the compression ladder
    /// before being sent to the remote store.
    pub upload_ceiling_bytes: usize,
}

/// Process-wide configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub remote_store: RemoteStoreConfig,
    /// Root of the legacy static-content tree (the front-end `public/`
    /// directory). Legacy asset references are root-relative paths under it.
    pub content_root: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL not configured".to_string()))?;

        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME")
            .map_err(|_| AppError::Config("CLOUDINARY_CLOUD_NAME not configured".to_string()))?;
        let api_key = env::var("CLOUDINARY_API_KEY")
            .map_err(|_| AppError::Config("CLOUDINARY_API_KEY not configured".to_string()))?;
        let api_secret = env::var("CLOUDINARY_API_SECRET")
            .map_err(|_| AppError::Config("CLOUDINARY_API_SECRET not configured".to_string()))?;

        let upload_ceiling_bytes = env::var("UPLOAD_CEILING_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPLOAD_CEILING_BYTES);

        let content_root =
            env::var("CONTENT_ROOT").unwrap_or_else(|_| "../frontend/public".to_string());

        Ok(Config {
            database_url,
            remote_store: RemoteStoreConfig {
                cloud_name,
                api_key,
                api_secret,
                upload_ceiling_bytes,
            },
            content_root,
        })
    }
}
