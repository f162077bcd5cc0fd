use crate::traits::{ObjectMetadata, ObjectStorage, ObjectStream, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use thumbnailer_core::{ObjectLocation, StorageBackend};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Directory under the root holding content metadata sidecars.
const METADATA_DIR: &str = ".metadata";

/// Local filesystem storage implementation
///
/// Each bucket is a directory under `base_path`; object keys are relative paths
/// inside it. Content metadata is kept in `{base_path}/.metadata/{bucket}/{key}.json`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding one directory per bucket
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn validate_bucket(bucket: &str) -> StorageResult<()> {
        if bucket.is_empty()
            || bucket.starts_with('.')
            || bucket.contains('/')
            || bucket.contains('\\')
        {
            return Err(StorageError::InvalidKey(format!(
                "Invalid bucket name: {}",
                bucket
            )));
        }
        Ok(())
    }

    fn validate_key(key: &str) -> StorageResult<()> {
        if key.is_empty()
            || key.starts_with('/')
            || key.split('/').any(|segment| segment == "..")
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert bucket and key to a filesystem path with traversal validation
    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        Self::validate_bucket(bucket)?;
        Self::validate_key(key)?;
        Ok(self.base_path.join(bucket).join(key))
    }

    fn metadata_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        Self::validate_bucket(bucket)?;
        Self::validate_key(key)?;
        Ok(self
            .base_path
            .join(METADATA_DIR)
            .join(bucket)
            .join(format!("{}.json", key)))
    }

    /// Content metadata recorded by the last `store` of this object.
    pub async fn read_metadata(&self, bucket: &str, key: &str) -> StorageResult<ObjectMetadata> {
        let path = self.metadata_path(bucket, key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!("{}/{}", bucket, key)));
        }
        let raw = fs::read(&path).await?;
        serde_json::from_slice(&raw).map_err(|e| {
            StorageError::BackendError(format!(
                "Corrupt metadata file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Create the containing folder for a file
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        self.ensure_parent_dir(path).await?;

        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<ObjectStream> {
        let path = self.object_path(bucket, key)?;
        let location = ObjectLocation::new(bucket, key);

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(location.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let stream = tokio_util::io::ReaderStream::new(file).map(|result| {
            result.map_err(|e| StorageError::DownloadFailed(format!("Failed to read chunk: {}", e)))
        });

        tracing::info!(
            path = %path.display(),
            bucket = %bucket,
            key = %key,
            "Local storage fetch opened"
        );

        Ok(ObjectStream::new(location, Box::pin(stream)))
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        let metadata_path = self.metadata_path(bucket, key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        if size != metadata.content_length {
            return Err(StorageError::UploadFailed(format!(
                "Content length mismatch for {}/{}: metadata says {} bytes, payload has {}",
                bucket, key, metadata.content_length, size
            )));
        }

        // Metadata goes first so an object file never exists without its sidecar.
        let encoded = serde_json::to_vec(metadata)
            .map_err(|e| StorageError::BackendError(format!("Failed to encode metadata: {}", e)))?;
        self.write_file(&metadata_path, &encoded).await?;

        if let Err(e) = self.write_file(&path, &data).await {
            for leftover in [&path, &metadata_path] {
                if let Err(cleanup) = fs::remove_file(leftover).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %leftover.display(),
                            error = %cleanup,
                            "Failed to remove partial write"
                        );
                    }
                }
            }
            return Err(e);
        }

        tracing::info!(
            path = %path.display(),
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            content_type = %metadata.content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage store successful"
        );

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        let metadata_path = self.metadata_path(bucket, key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        if fs::try_exists(&metadata_path).await.unwrap_or(false) {
            fs::remove_file(&metadata_path).await?;
        }

        tracing::info!(
            path = %path.display(),
            bucket = %bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
