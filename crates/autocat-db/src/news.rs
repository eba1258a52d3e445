//! Repository for news article thumbnail assets.

use crate::records::{AssetRecord, AssetRecordSource};
use async_trait::async_trait;
use autocat_core::models::NewsArticle;
use autocat_core::{AppError, ImageCategory};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct NewsRepository {
    pool: PgPool,
}

impl NewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Articles with a thumbnail set.
    #[tracing::instrument(skip(self), fields(db.table = "news_articles"))]
    pub async fn list_with_thumbnails(&self) -> Result<Vec<NewsArticle>, AppError> {
        let rows = sqlx::query_as::<Postgres, NewsArticle>(
            r#"
            SELECT id, title, thumbnail_url, created_at, updated_at
            FROM news_articles
            WHERE thumbnail_url IS NOT NULL AND thumbnail_url <> ''
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "news_articles"))]
    pub async fn update_thumbnail_url(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE news_articles
            SET thumbnail_url = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("news article {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetRecordSource for NewsRepository {
    fn name(&self) -> &'static str {
        "news_articles"
    }

    async fn list_with_assets(&self) -> Result<Vec<AssetRecord>, AppError> {
        let articles = self.list_with_thumbnails().await?;

        Ok(articles
            .into_iter()
            .filter_map(|article| {
                article.thumbnail_url.map(|reference| AssetRecord {
                    id: article.id,
                    category: ImageCategory::Folder("news".to_string()),
                    reference,
                })
            })
            .collect())
    }

    async fn update_reference(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        self.update_thumbnail_url(id, url).await
    }
}
