//! Image categories
//!
//! Every uploaded asset belongs to a logical category that determines its
//! storage folder on both backends. Image-setting assets use a fixed set of
//! categories; catalog assets (vehicle galleries, news thumbnails,
//! specification sheets) use free-form folders.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Logical bucket an image belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageCategory {
    Banner,
    Partner,
    Advantage,
    PageBanner,
    About,
    /// Free-form folder for catalog assets (e.g. "vehicles", "news",
    /// "specifications").
    #[serde(untagged)]
    Folder(String),
}

impl ImageCategory {
    /// Parse a fixed image-setting category. Free-form folders are created
    /// with [`ImageCategory::Folder`] directly and never come from client
    /// input, so anything outside the fixed set is a validation error here.
    pub fn parse_setting(s: &str) -> Result<Self, AppError> {
        match s {
            "banner" => Ok(ImageCategory::Banner),
            "partner" => Ok(ImageCategory::Partner),
            "advantage" => Ok(ImageCategory::Advantage),
            "page-banner" => Ok(ImageCategory::PageBanner),
            "about" => Ok(ImageCategory::About),
            other => Err(AppError::Validation(format!(
                "Invalid image type '{}'. Must be 'banner', 'partner', 'advantage', 'page-banner', or 'about'.",
                other
            ))),
        }
    }

    /// Storage subfolder for this category, shared by both backends.
    pub fn folder(&self) -> &str {
        match self {
            ImageCategory::Banner => "banners",
            ImageCategory::Partner => "partners",
            ImageCategory::Advantage => "advantages",
            ImageCategory::PageBanner => "page-banners",
            ImageCategory::About => "about",
            ImageCategory::Folder(name) => name,
        }
    }

    /// Stable name used in database rows and upload public ids.
    pub fn as_str(&self) -> &str {
        match self {
            ImageCategory::Banner => "banner",
            ImageCategory::Partner => "partner",
            ImageCategory::Advantage => "advantage",
            ImageCategory::PageBanner => "page-banner",
            ImageCategory::About => "about",
            ImageCategory::Folder(name) => name,
        }
    }
}
