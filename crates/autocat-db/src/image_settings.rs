//! Repository for the image_settings table.

use crate::records::{AssetRecord, AssetRecordSource};
use async_trait::async_trait;
use autocat_core::models::ImageSetting;
use autocat_core::{AppError, ImageCategory};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct ImageSettingRepository {
    pool: PgPool,
}

impl ImageSettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rewrite the asset reference after an upload or migration.
    #[tracing::instrument(skip(self), fields(db.table = "image_settings"))]
    pub async fn update_url(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE image_settings
            SET url = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("image setting {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetRecordSource for ImageSettingRepository {
    fn name(&self) -> &'static str {
        "image_settings"
    }

    async fn list_with_assets(&self) -> Result<Vec<AssetRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, ImageSetting>(
            r#"
            SELECT id, category, title, description, url, display_order, active,
                   created_at, updated_at
            FROM image_settings
            WHERE url <> ''
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                // Rows predating category validation keep their raw value as
                // a free-form folder.
                let category = ImageCategory::parse_setting(&row.category)
                    .unwrap_or(ImageCategory::Folder(row.category));
                AssetRecord {
                    id: row.id,
                    category,
                    reference: row.url,
                }
            })
            .collect())
    }

    async fn update_reference(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        self.update_url(id, url).await
    }
}
