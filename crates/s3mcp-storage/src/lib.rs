//! s3mcp storage library
//!
//! The `ObjectStorage` trait is the storage client adapter: every operation the
//! server exposes maps onto exactly one trait method, and every backend failure
//! is normalized into a `StorageError` kind.
//!
//! Backends:
//!
//! - **S3** (`storage-s3`): AWS S3 or any S3-compatible endpoint via the AWS SDK.
//! - **Local** (`storage-local`): buckets as directories, for offline use and tests.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use s3mcp_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{
    ObjectListing, ObjectStorage, PutReceipt, StorageError, StorageResult, StoredObject,
};
