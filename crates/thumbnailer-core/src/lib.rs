//! Thumbnailer Core Library
//!
//! This crate provides the domain model shared across all thumbnailer components:
//! configuration, the error taxonomy, the upload event model and the object key validator.

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod key;
pub mod policy;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, LogFormat, PipelineConfig, StorageConfig};
pub use error::{ErrorMetadata, EventError, LogLevel, Rejection};
pub use aws_lambda_events::s3::S3Event;
pub use event::{decode_object_key, ObjectLocation, UploadEvent};
pub use key::{ImageKind, KeyValidator, ParsedKey};
pub use policy::ResizePolicy;
pub use storage_types::StorageBackend;
