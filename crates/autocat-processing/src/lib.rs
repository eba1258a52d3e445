//! Autocat Processing Library
//!
//! Image compression for the asset pipeline: shrink an arbitrary raster
//! image toward a byte budget by walking an ordered ladder of
//! quality/resolution candidates.

pub mod compression;

pub use compression::{CompressError, CompressionPolicy, CompressionStep, ImageCompressor};
