use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use thumbnailer_core::ResizePolicy;

use crate::error::ProcessingError;

/// Interpolation used for every resize.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Square region kept after scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Dimensions computed for a policy, before any pixels are touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub crop: Option<CropRect>,
}

impl ResizePlan {
    /// Dimensions of the final image.
    pub fn output_dimensions(&self) -> (u32, u32) {
        match self.crop {
            Some(crop) => (crop.size, crop.size),
            None => (self.scaled_width, self.scaled_height),
        }
    }
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Calculate scaled dimensions and crop for `policy`.
    pub fn plan(width: u32, height: u32, policy: ResizePolicy) -> Result<ResizePlan, ProcessingError> {
        let target_size = policy.target_size();
        if width == 0 || height == 0 || target_size == 0 {
            return Err(ProcessingError::InvalidDimensions {
                width,
                height,
                target_size,
            });
        }

        let plan = match policy {
            ResizePolicy::FitLongestSide(size) => {
                let (w, h, s) = (width as u64, height as u64, size as u64);
                // Floor division; a side may not reach 0 for extreme aspect ratios.
                let (new_width, new_height) = if w > h {
                    (s, (s * h / w).max(1))
                } else {
                    ((s * w / h).max(1), s)
                };
                ResizePlan {
                    scaled_width: new_width as u32,
                    scaled_height: new_height as u32,
                    crop: None,
                }
            }
            ResizePolicy::CenterCropSquare(size) => {
                let ratio = size as f64 / width.min(height) as f64;
                let scaled_width = ((width as f64 * ratio).round() as u32).max(1);
                let scaled_height = ((height as f64 * ratio).round() as u32).max(1);
                let side = scaled_width.min(scaled_height);
                ResizePlan {
                    scaled_width,
                    scaled_height,
                    crop: Some(CropRect {
                        x: (scaled_width - side) / 2,
                        y: (scaled_height - side) / 2,
                        size: side,
                    }),
                }
            }
        };

        Ok(plan)
    }

    /// Resize `img` according to `policy` with bilinear interpolation.
    pub fn apply(img: &DynamicImage, policy: ResizePolicy) -> Result<DynamicImage, ProcessingError> {
        let (width, height) = img.dimensions();
        let plan = Self::plan(width, height, policy)?;

        tracing::debug!(
            width,
            height,
            scaled_width = plan.scaled_width,
            scaled_height = plan.scaled_height,
            policy = %policy,
            "Applying resize"
        );

        let scaled = img.resize_exact(plan.scaled_width, plan.scaled_height, RESIZE_FILTER);

        Ok(match plan.crop {
            Some(crop) => scaled.crop_imm(crop.x, crop.y, crop.size, crop.size),
            None => scaled,
        })
    }
}
