//! Autocat Core Library
//!
//! Shared domain types for the autocat catalog backend: error taxonomy,
//! environment configuration, image categories, and the record models that
//! carry asset references.

pub mod category;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use category::ImageCategory;
pub use config::{Config, RemoteStoreConfig};
pub use error::AppError;
