//! Autocat Services Library
//!
//! Service-layer entrypoints the catalog and content handlers call into.
//! Currently the image ingest service: validate, compress, upload, and
//! replace/delete previously stored assets.

pub mod ingest;

pub use ingest::IngestService;
