//! Autocat Storage Library
//!
//! Asset storage for the catalog backend: the remote object store the site
//! uploads to, the legacy local-filesystem backend it is migrating away
//! from, and the router that decides which backend owns a stored reference.
//!
//! # Asset references
//!
//! A stored reference is either a fully-qualified remote URL (host
//! identifies the remote backend) or a root-relative legacy path of the
//! form `/images/{folder}/{name}.{ext}`. Classification is centralized in
//! [`router::classify`]; exactly one backend resolves any given reference.

pub mod local;
pub mod remote;
pub mod router;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStore;
pub use remote::RemoteStore;
pub use router::{classify, AssetRef, AssetRouter};
pub use traits::{AssetStore, StorageError, StorageResult, UploadTarget};
