use std::fmt::{Display, Formatter, Result as FmtResult};
use thumbnailer_core::{ErrorMetadata, EventError, LogLevel};
use thumbnailer_storage::StorageError;

/// Errors from decoding, resizing and encoding images
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Invalid dimensions: {width}x{height} with target size {target_size}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        target_size: u32,
    },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image task did not complete: {0}")]
    Task(String),
}

impl ErrorMetadata for ProcessingError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessingError::InvalidDimensions { .. } => "INVALID_DIMENSIONS",
            ProcessingError::Decode(_) => "DECODE_ERROR",
            ProcessingError::Encode(_) => "ENCODE_ERROR",
            ProcessingError::Task(_) => "TASK_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ProcessingError::Task(_))
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}

/// Pipeline states. A run moves strictly forward through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Intake,
    Validate,
    Fetch,
    Decode,
    Resize,
    Encode,
    Store,
    Delete,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Intake => "intake",
            PipelineStage::Validate => "validate",
            PipelineStage::Fetch => "fetch",
            PipelineStage::Decode => "decode",
            PipelineStage::Resize => "resize",
            PipelineStage::Encode => "encode",
            PipelineStage::Store => "store",
            PipelineStage::Delete => "delete",
            PipelineStage::Done => "done",
        }
    }
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A fault that ends the invocation as a failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid notification: {0}")]
    Event(#[from] EventError),

    #[error("Stage {stage} failed: {source}")]
    Storage {
        stage: PipelineStage,
        #[source]
        source: StorageError,
    },

    #[error("Stage {stage} failed: {source}")]
    Processing {
        stage: PipelineStage,
        #[source]
        source: ProcessingError,
    },
}

impl PipelineError {
    pub fn storage(stage: PipelineStage, source: StorageError) -> Self {
        PipelineError::Storage { stage, source }
    }

    pub fn processing(stage: PipelineStage, source: ProcessingError) -> Self {
        PipelineError::Processing { stage, source }
    }

    /// Stage that was running when the fault occurred.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Event(_) => PipelineStage::Intake,
            PipelineError::Storage { stage, .. } | PipelineError::Processing { stage, .. } => {
                *stage
            }
        }
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            PipelineError::Event(e) => e.error_code(),
            PipelineError::Storage { source, .. } => source.error_code(),
            PipelineError::Processing { source, .. } => source.error_code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            PipelineError::Event(e) => e.is_recoverable(),
            PipelineError::Storage { source, .. } => source.is_recoverable(),
            PipelineError::Processing { source, .. } => source.is_recoverable(),
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}
