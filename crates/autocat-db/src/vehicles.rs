//! Repository for vehicle specification-sheet assets.
//!
//! Vehicles carry two asset references: the listing image and the
//! specification sheet. Only the specification sheet went through the
//! legacy local store, so that is the field this source migrates.

use crate::records::{AssetRecord, AssetRecordSource};
use async_trait::async_trait;
use autocat_core::models::Vehicle;
use autocat_core::{AppError, ImageCategory};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Vehicles whose specification sheet is set.
    #[tracing::instrument(skip(self), fields(db.table = "vehicles"))]
    pub async fn list_with_specifications(&self) -> Result<Vec<Vehicle>, AppError> {
        let rows = sqlx::query_as::<Postgres, Vehicle>(
            r#"
            SELECT id, name, image_url, specifications_url, created_at, updated_at
            FROM vehicles
            WHERE specifications_url IS NOT NULL AND specifications_url <> ''
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Rewrite the specification-sheet reference.
    #[tracing::instrument(skip(self), fields(db.table = "vehicles"))]
    pub async fn update_specifications_url(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET specifications_url = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("vehicle {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetRecordSource for VehicleRepository {
    fn name(&self) -> &'static str {
        "vehicles"
    }

    async fn list_with_assets(&self) -> Result<Vec<AssetRecord>, AppError> {
        let vehicles = self.list_with_specifications().await?;

        Ok(vehicles
            .into_iter()
            .filter_map(|vehicle| {
                vehicle.specifications_url.map(|reference| AssetRecord {
                    id: vehicle.id,
                    category: ImageCategory::Folder("specifications".to_string()),
                    reference,
                })
            })
            .collect())
    }

    async fn update_reference(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        self.update_specifications_url(id, url).await
    }
}
