//! Record models that carry asset references.
//!
//! Asset references are plain string fields: either a fully-qualified remote
//! URL or a root-relative legacy path (`/images/<folder>/<name>.<ext>`).
//! They are created by a successful upload, replaced wholesale (old asset
//! deleted, new URL substituted) and removed when the owning record goes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Site image managed through the image-setting screens (banners, partner
/// logos, advantage tiles, page banners, about-page images).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImageSetting {
    pub id: Uuid,
    /// One of the fixed setting categories; see `ImageCategory::parse_setting`.
    pub category: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub display_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vehicle listing. Only the asset-bearing fields are modeled here; the rest
/// of the catalog record (pricing, trim data, search fields) is ordinary CRUD
/// handled elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    /// Primary listing image.
    pub image_url: Option<String>,
    /// Specification-sheet image (one per vehicle).
    pub specifications_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// News article with an optional thumbnail asset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsArticle {
    pub id: Uuid,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
