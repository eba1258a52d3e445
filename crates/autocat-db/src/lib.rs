//! Autocat DB Library
//!
//! Database repositories for the records that carry asset references.
//! Only the queries the asset pipeline needs live here (enumerate records
//! with references, rewrite a reference); general catalog CRUD is wired
//! elsewhere and out of scope for this crate.

pub mod image_settings;
pub mod news;
pub mod records;
pub mod vehicles;

pub use image_settings::ImageSettingRepository;
pub use news::NewsRepository;
pub use records::{AssetRecord, AssetRecordSource};
pub use vehicles::VehicleRepository;

use autocat_core::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to Postgres and run pending migrations.
pub async fn connect(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::Config(format!("Migration failed: {}", e)))?;

    Ok(pool)
}
