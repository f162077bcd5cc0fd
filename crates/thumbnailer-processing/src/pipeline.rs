//! Thumbnail pipeline: validate → fetch → decode → resize → encode → store → delete.
//!
//! One [`ThumbnailPipeline::run`] handles one upload, sequentially. A rejected
//! key ends the run early with [`PipelineOutcome::Rejected`] before anything is
//! fetched. Any other failure is returned as a [`PipelineError`] for the invoking
//! runtime to retry or dead-letter; the pipeline itself never retries.
//!
//! The source is deleted only after the destination write is confirmed, and a
//! failed delete does not fail the run. The fetched object stream is released
//! exactly once on every exit path, as soon as its body has been read or when
//! the run unwinds.

use std::sync::Arc;
use std::time::Instant;

use thumbnailer_core::constants::{REJECTED_SIGNAL, SUCCESS_SIGNAL};
use thumbnailer_core::{
    ErrorMetadata, KeyValidator, LogLevel, ObjectLocation, PipelineConfig, Rejection,
    S3Event, UploadEvent,
};
use thumbnailer_storage::ObjectStorage;

use crate::error::{PipelineError, PipelineStage, ProcessingError};
use crate::image::{ImageCodec, ImageResize};

/// Record of a stored derivative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRun {
    pub source: ObjectLocation,
    pub destination: ObjectLocation,
    pub width: u32,
    pub height: u32,
    pub content_type: String,
    pub content_length: u64,
    /// `false` when the best-effort delete of the source failed.
    pub source_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed(CompletedRun),
    Rejected(Rejection),
}

impl PipelineOutcome {
    /// Value returned to the invoking runtime.
    pub fn signal(&self) -> &'static str {
        match self {
            PipelineOutcome::Completed(_) => SUCCESS_SIGNAL,
            PipelineOutcome::Rejected(_) => REJECTED_SIGNAL,
        }
    }

    /// Stage the run ended in: `Done` once stored, `Validate` when the key was declined.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineOutcome::Completed(_) => PipelineStage::Done,
            PipelineOutcome::Rejected(_) => PipelineStage::Validate,
        }
    }

    pub fn completed(&self) -> Option<&CompletedRun> {
        match self {
            PipelineOutcome::Completed(run) => Some(run),
            PipelineOutcome::Rejected(_) => None,
        }
    }
}

pub struct ThumbnailPipeline {
    storage: Arc<dyn ObjectStorage>,
    config: PipelineConfig,
    validator: KeyValidator,
}

impl ThumbnailPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        config: PipelineConfig,
    ) -> Result<Self, anyhow::Error> {
        config.validate()?;
        let validator = config.key_validator()?;

        Ok(Self {
            storage,
            config,
            validator,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process the first record of `notification` and return the runtime signal.
    pub async fn handle_notification(
        &self,
        notification: &S3Event,
    ) -> Result<String, PipelineError> {
        let event = UploadEvent::from_notification(notification).map_err(|e| {
            let err = PipelineError::from(e);
            tracing::error!(
                error = %err,
                error_code = err.error_code(),
                stage = %err.stage(),
                "Rejecting malformed notification"
            );
            err
        })?;

        let outcome = self.run(&event).await?;
        Ok(outcome.signal().to_string())
    }

    pub async fn run(&self, event: &UploadEvent) -> Result<PipelineOutcome, PipelineError> {
        let start = Instant::now();
        let result = self.execute(event).await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(outcome @ PipelineOutcome::Completed(run)) => tracing::info!(
                source = %run.source,
                destination = %run.destination,
                width = run.width,
                height = run.height,
                size_bytes = run.content_length,
                source_deleted = run.source_deleted,
                stage = %outcome.stage(),
                duration_ms,
                "Thumbnail pipeline completed"
            ),
            Ok(outcome @ PipelineOutcome::Rejected(rejection)) => log_rejection(
                rejection,
                outcome.stage(),
                &event.source_bucket,
                &event.source_key,
            ),
            Err(err) => tracing::error!(
                error = %err,
                error_code = err.error_code(),
                recoverable = err.is_recoverable(),
                stage = %err.stage(),
                bucket = %event.source_bucket,
                key = %event.source_key,
                duration_ms,
                "Thumbnail pipeline failed"
            ),
        }

        result
    }

    async fn execute(&self, event: &UploadEvent) -> Result<PipelineOutcome, PipelineError> {
        let source = event.source();

        let parsed = match self.validator.validate(&event.source_key) {
            Ok(parsed) => parsed,
            Err(rejection) => return Ok(PipelineOutcome::Rejected(rejection)),
        };
        let Some(kind) = parsed.image_kind() else {
            return Ok(PipelineOutcome::Rejected(Rejection::UnsupportedType {
                file_name: parsed.base_name,
                extension: parsed.extension,
            }));
        };

        let mut stream = self
            .storage
            .fetch(&source.bucket, &source.key)
            .await
            .map_err(|e| PipelineError::storage(PipelineStage::Fetch, e))?;
        let data = stream
            .read_to_end()
            .await
            .map_err(|e| PipelineError::storage(PipelineStage::Fetch, e))?;
        stream.release();

        tracing::debug!(
            source = %source,
            size_bytes = data.len(),
            stage = %PipelineStage::Fetch,
            "Fetched source object"
        );

        let policy = self.config.policy;
        let content_type = parsed.content_type();
        let img = run_blocking(PipelineStage::Decode, move || ImageCodec::decode(&data)).await?;
        let resized =
            run_blocking(PipelineStage::Resize, move || ImageResize::apply(&img, policy)).await?;
        let derivative = run_blocking(PipelineStage::Encode, move || {
            ImageCodec::encode(&resized, kind, content_type)
        })
        .await?;

        let destination = event.destination();
        tracing::info!(
            destination = %destination,
            size_bytes = derivative.content_length,
            content_type = %derivative.content_type,
            stage = %PipelineStage::Store,
            "Writing derivative"
        );
        self.storage
            .store(
                &destination.bucket,
                &destination.key,
                derivative.encoded_bytes.clone(),
                &derivative.metadata(),
            )
            .await
            .map_err(|e| PipelineError::storage(PipelineStage::Store, e))?;

        tracing::info!(
            source = %source,
            stage = %PipelineStage::Delete,
            "Deleting source object"
        );
        let source_deleted = match self.storage.delete(&source.bucket, &source.key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    error_code = e.error_code(),
                    source = %source,
                    "Failed to delete source object; derivative is already stored"
                );
                false
            }
        };

        Ok(PipelineOutcome::Completed(CompletedRun {
            source,
            destination,
            width: derivative.width,
            height: derivative.height,
            content_type: derivative.content_type,
            content_length: derivative.content_length,
            source_deleted,
        }))
    }
}

/// Run CPU-bound image work off the async executor and wait for it.
async fn run_blocking<T, F>(stage: PipelineStage, f: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, ProcessingError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::processing(stage, ProcessingError::Task(e.to_string())))?
        .map_err(|e| PipelineError::processing(stage, e))
}

fn log_rejection(rejection: &Rejection, stage: PipelineStage, bucket: &str, key: &str) {
    let code = rejection.error_code();
    let stage = stage.as_str();
    match rejection.log_level() {
        LogLevel::Debug => {
            tracing::debug!(reason = %rejection, code, stage, bucket, key, "Skipping upload")
        }
        LogLevel::Info => {
            tracing::info!(reason = %rejection, code, stage, bucket, key, "Skipping upload")
        }
        LogLevel::Warn => {
            tracing::warn!(reason = %rejection, code, stage, bucket, key, "Skipping upload")
        }
        LogLevel::Error => {
            tracing::error!(reason = %rejection, code, stage, bucket, key, "Skipping upload")
        }
    }
}
