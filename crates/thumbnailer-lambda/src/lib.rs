//! Lambda adapter for the thumbnail pipeline.
//!
//! The runtime deserializes each S3 notification into an [`S3Event`] and hands it
//! to [`handle_event`].
//! The returned string is the invocation result: `"Ok"` once a derivative is
//! stored, `""` when the key was rejected. Faults become invocation errors so
//! the platform's retry and dead-letter policy applies.

use std::sync::Arc;

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{Error, LambdaEvent};
use thumbnailer_core::{Config, PipelineConfig};
use thumbnailer_processing::ThumbnailPipeline;
use thumbnailer_storage::ObjectStorage;

/// State shared by every invocation of one execution environment.
#[derive(Clone)]
pub struct HandlerContext {
    pub storage: Arc<dyn ObjectStorage>,
    pub pipeline: PipelineConfig,
}

impl HandlerContext {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: &Config) -> Self {
        Self {
            storage,
            pipeline: config.pipeline.clone(),
        }
    }
}

pub async fn handle_event(
    ctx: &HandlerContext,
    event: LambdaEvent<S3Event>,
) -> Result<String, Error> {
    let LambdaEvent {
        payload: notification,
        context: lambda_ctx,
    } = event;
    tracing::debug!(request_id = %lambda_ctx.request_id, "Invocation received");

    // Built per invocation so nothing but the storage client outlives a request.
    let pipeline = ThumbnailPipeline::new(ctx.storage.clone(), ctx.pipeline.clone())
        .map_err(|e| Error::from(e.to_string()))?;

    let signal = pipeline.handle_notification(&notification).await?;
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lambda_events::event::s3::{S3Bucket, S3Entity, S3EventRecord, S3Object};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use lambda_runtime::Context;
    use std::io::Cursor;
    use thumbnailer_core::StorageConfig;
    use thumbnailer_storage::LocalStorage;

    fn config() -> Config {
        Config {
            environment: "test".to_string(),
            log_format: Default::default(),
            pipeline: PipelineConfig::default(),
            storage: StorageConfig::local("unused"),
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([9, 9, 9])));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn upload(bucket: &str, key: &str) -> LambdaEvent<S3Event> {
        let payload = S3Event {
            records: vec![S3EventRecord {
                event_name: Some("ObjectCreated:Put".to_string()),
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: Some(bucket.to_string()),
                        ..Default::default()
                    },
                    object: S3Object {
                        key: Some(key.to_string()),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                ..Default::default()
            }],
        };
        LambdaEvent::new(payload, Context::default())
    }

    async fn context(dir: &std::path::Path) -> HandlerContext {
        let storage: Arc<dyn ObjectStorage> = Arc::new(LocalStorage::new(dir).await.unwrap());
        HandlerContext::new(storage, &config())
    }

    #[tokio::test]
    async fn test_event_from_runtime_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
        std::fs::write(dir.path().join("uploads/cat.png"), png(800, 600)).unwrap();

        let payload: S3Event = serde_json::from_str(
            r#"{
                "Records": [{
                    "eventVersion": "2.1",
                    "eventSource": "aws:s3",
                    "awsRegion": "eu-west-1",
                    "eventTime": "2024-03-01T10:15:00.000Z",
                    "eventName": "ObjectCreated:Put",
                    "userIdentity": { "principalId": "AWS:AIDAINPONIXQXHT3IKHL2" },
                    "requestParameters": { "sourceIPAddress": "205.255.255.255" },
                    "responseElements": { "x-amz-request-id": "D82B88E5F771F645" },
                    "s3": {
                        "s3SchemaVersion": "1.0",
                        "configurationId": "thumbnails",
                        "bucket": {
                            "name": "uploads",
                            "ownerIdentity": { "principalId": "A3I5XTEXAMAI3E" },
                            "arn": "arn:aws:s3:::uploads"
                        },
                        "object": { "key": "cat.png", "size": 1, "eTag": "0", "sequencer": "0" }
                    }
                }]
            }"#,
        )
        .unwrap();
        let ctx = context(dir.path()).await;

        let signal = handle_event(&ctx, LambdaEvent::new(payload, Context::default()))
            .await
            .unwrap();
        assert_eq!(signal, "Ok");
        assert!(dir.path().join("uploads-resized/cat.png").exists());
        assert!(!dir.path().join("uploads/cat.png").exists());
    }

    #[tokio::test]
    async fn test_rejected_key_returns_empty_signal() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path()).await;

        let signal = handle_event(&ctx, upload("uploads", "readme")).await.unwrap();
        assert_eq!(signal, "");
    }

    #[tokio::test]
    async fn test_missing_object_fails_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path()).await;

        let result = handle_event(&ctx, upload("uploads", "gone.png")).await;
        assert!(result.is_err());
    }
}
