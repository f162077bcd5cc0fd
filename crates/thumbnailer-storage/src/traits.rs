//! Storage abstraction trait
//!
//! This module defines the [`ObjectStorage`] trait all storage backends implement,
//! and [`ObjectStream`], the handle to a fetched object's body.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use thumbnailer_core::{ErrorMetadata, LogLevel, ObjectLocation, StorageBackend};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorMetadata for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::NotFound(_) => "NOT_FOUND",
            StorageError::AccessDenied(_) => "ACCESS_DENIED",
            StorageError::UploadFailed(_) => "UPLOAD_FAILED",
            StorageError::DownloadFailed(_) => "DOWNLOAD_FAILED",
            StorageError::DeleteFailed(_) => "DELETE_FAILED",
            StorageError::InvalidKey(_) => "INVALID_KEY",
            StorageError::BackendError(_) => "STORAGE_BACKEND_ERROR",
            StorageError::IoError(_) => "IO_ERROR",
            StorageError::ConfigError(_) => "STORAGE_CONFIG_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DownloadFailed(_)
                | StorageError::DeleteFailed(_)
                | StorageError::BackendError(_)
                | StorageError::IoError(_)
        )
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked body of a fetched object.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Content metadata written alongside a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: String,
    pub content_length: u64,
}

/// Open body of a fetched object.
///
/// The underlying stream (and the connection behind it) is released exactly
/// once: on [`ObjectStream::release`] or when the handle is dropped, whichever
/// comes first. A release hook attached with [`ObjectStream::on_release`] runs
/// at that moment.
pub struct ObjectStream {
    location: ObjectLocation,
    inner: Option<ByteStream>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl ObjectStream {
    pub fn new(location: ObjectLocation, stream: ByteStream) -> Self {
        Self {
            location,
            inner: Some(stream),
            on_release: None,
        }
    }

    /// Stream yielding `data` as a single chunk.
    pub fn from_bytes(location: ObjectLocation, data: Bytes) -> Self {
        let stream = futures::stream::once(async move { Ok::<_, StorageError>(data) });
        Self::new(location, Box::pin(stream))
    }

    /// Run `hook` when the stream is released.
    pub fn on_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    pub fn location(&self) -> &ObjectLocation {
        &self.location
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    /// Collect the remaining body into one buffer.
    pub async fn read_to_end(&mut self) -> StorageResult<Bytes> {
        let stream = self.inner.as_mut().ok_or_else(|| {
            StorageError::DownloadFailed(format!("Stream for {} already released", self.location))
        })?;

        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        Ok(buffer.freeze())
    }

    /// Release the stream now instead of waiting for drop.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(stream) = self.inner.take() {
            drop(stream);
            if let Some(hook) = self.on_release.take() {
                hook();
            }
            tracing::debug!(
                bucket = %self.location.bucket,
                key = %self.location.key,
                "Object stream released"
            );
        }
    }
}

impl Drop for ObjectStream {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStream")
            .field("location", &self.location)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Object storage collaborator
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// pipeline works with any backend without coupling to its addressing or
/// transport details. Every operation addresses an object by bucket and key.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Open the object for reading.
    async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<ObjectStream>;

    /// Write `data` with the given content metadata. `Ok` confirms the write.
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()>;

    /// Delete the object.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
