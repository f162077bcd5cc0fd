//! Helpers behind the `thumbnailer` command line tool.

use anyhow::{Context, Result};
use std::path::Path;
use thumbnailer_core::{ImageKind, KeyValidator, ResizePolicy};
use thumbnailer_processing::{Derivative, ImageCodec, ImageResize};

/// Output kind and content type for a file, judged by its name the same way
/// upload keys are.
pub fn output_kind(path: &Path) -> Result<(ImageKind, String)> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Output path {} has no usable file name", path.display()))?;

    let parsed = KeyValidator::with_default_extensions()?.validate(name)?;
    let kind = parsed
        .image_kind()
        .with_context(|| format!("No encoder for {}", parsed.extension))?;

    Ok((kind, parsed.content_type()))
}

/// Resize the image at `input` and write the derivative to `output`.
pub fn resize_file(input: &Path, output: &Path, policy: ResizePolicy) -> Result<Derivative> {
    let (kind, content_type) = output_kind(output)?;

    let data =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    tracing::debug!(
        input = %input.display(),
        size_bytes = data.len(),
        policy = %policy,
        "Resizing file"
    );
    let img = ImageCodec::decode(&data)?;
    let resized = ImageResize::apply(&img, policy)?;
    let derivative = ImageCodec::encode(&resized, kind, content_type)?;

    std::fs::write(output, &derivative.encoded_bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(derivative)
}
