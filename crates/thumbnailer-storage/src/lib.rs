//! Thumbnailer Storage Library
//!
//! This crate provides the object storage collaborator used by the pipeline: the
//! [`ObjectStorage`] trait and its S3 and local filesystem implementations.
//!
//! Objects are addressed by bucket and key. Keys must not contain `..` segments or
//! a leading `/`.

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
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use thumbnailer_core::StorageBackend;
pub use traits::{ByteStream, ObjectMetadata, ObjectStorage, ObjectStream, StorageError, StorageResult};
