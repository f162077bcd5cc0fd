//! Image processing module
//!
//! - Decoding and encoding (codec)
//! - Dimension planning and scaling (resize)

pub mod codec;
pub mod resize;

pub use codec::{Derivative, ImageCodec};
pub use resize::{CropRect, ImageResize, ResizePlan};
