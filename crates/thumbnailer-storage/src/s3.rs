use crate::traits::{ObjectMetadata, ObjectStorage, ObjectStream, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use thumbnailer_core::{ObjectLocation, StorageBackend};

/// S3 storage implementation
///
/// `object_store` binds a client to one bucket, so a client is built for each
/// bucket an operation addresses. Credentials come from the environment.
#[derive(Clone, Debug)]
pub struct S3Storage {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        if region.trim().is_empty() {
            return Err(StorageError::ConfigError(
                "S3 region must not be empty".to_string(),
            ));
        }

        Ok(S3Storage {
            region,
            endpoint_url,
        })
    }

    fn client(&self, bucket: &str) -> StorageResult<AmazonS3> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket.to_string());

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }
}

/// Map `object_store` failures that carry a meaning for the pipeline; the rest
/// become the operation-specific variant built by `fallback`.
fn map_error(
    err: ObjectStoreError,
    location: &ObjectLocation,
    fallback: fn(String) -> StorageError,
) -> StorageError {
    match err {
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(location.to_string()),
        ObjectStoreError::PermissionDenied { .. } | ObjectStoreError::Unauthenticated { .. } => {
            StorageError::AccessDenied(format!("{}: {}", location, err))
        }
        other => fallback(other.to_string()),
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<ObjectStream> {
        let start = std::time::Instant::now();
        let store = self.client(bucket)?;
        let location = ObjectLocation::new(bucket, key);
        let path = Path::from(key.to_string());

        let result: ObjectResult<_> = store.get(&path).await;

        let result = result.map_err(|e| {
            let mapped = map_error(e, &location, StorageError::DownloadFailed);
            tracing::error!(
                error = %mapped,
                bucket = %bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 get failed"
            );
            mapped
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = result.meta.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 get successful"
        );

        let stream = result
            .into_stream()
            .map(|chunk| chunk.map_err(|e| StorageError::DownloadFailed(e.to_string())));

        Ok(ObjectStream::new(location, Box::pin(stream)))
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let store = self.client(bucket)?;
        let location = ObjectLocation::new(bucket, key);
        let path = Path::from(key.to_string());
        let size = data.len() as u64;

        if size != metadata.content_length {
            return Err(StorageError::UploadFailed(format!(
                "Content length mismatch for {}: metadata says {} bytes, payload has {}",
                location, metadata.content_length, size
            )));
        }

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, metadata.content_type.clone().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = store
            .put_opts(&path, PutPayload::from(data), options)
            .await;

        result.map_err(|e| {
            let mapped = map_error(e, &location, StorageError::UploadFailed);
            tracing::error!(
                error = %mapped,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 put failed"
            );
            mapped
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            content_type = %metadata.content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 put successful"
        );

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let store = self.client(bucket)?;
        let location = ObjectLocation::new(bucket, key);
        let path = Path::from(key.to_string());

        let result: ObjectResult<_> = store.delete(&path).await;

        result.map_err(|e| {
            let mapped = map_error(e, &location, StorageError::DeleteFailed);
            tracing::error!(
                error = %mapped,
                bucket = %bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            mapped
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
