//! Thumbnailer Processing Library
//!
//! This crate turns an uploaded image into its resized derivative: the resize
//! engine, the encoder and the pipeline that sequences fetch, transform, store
//! and delete for one upload.

pub mod error;
pub mod image;
pub mod pipeline;

// Re-export commonly used types
pub use error::{PipelineError, PipelineStage, ProcessingError};
pub use self::image::{CropRect, Derivative, ImageCodec, ImageResize, ResizePlan};
pub use pipeline::{CompletedRun, PipelineOutcome, ThumbnailPipeline};
