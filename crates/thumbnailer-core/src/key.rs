//! Object key validation
//!
//! A key is split into its directory prefix, base name and trailing extension.
//! Only the final path segment can contribute the extension, so dots inside
//! directory names never count.

use anyhow::Context;
use regex::Regex;

use crate::constants::{ALLOWED_EXTENSIONS, CONTENT_TYPE_PREFIX};
use crate::error::Rejection;

/// `(prefix/)?(name)(.ext)` where neither name nor ext may cross a `/`.
const KEY_PATTERN: &str = r"^(.*/)?([^/]*)(\.[^./]+)$";

/// Output codec implied by an object's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Map an extension (with or without the leading dot) to a codec.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.') {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            _ => None,
        }
    }
}

/// A validated object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub path_prefix: String,
    pub base_name: String,
    /// Includes the leading dot, e.g. `.png`.
    pub extension: String,
}

impl ParsedKey {
    pub fn extension_without_dot(&self) -> &str {
        &self.extension[1..]
    }

    /// `image/` followed by the extension as written in the key.
    pub fn content_type(&self) -> String {
        format!("{}{}", CONTENT_TYPE_PREFIX, self.extension_without_dot())
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }

    pub fn image_kind(&self) -> Option<ImageKind> {
        ImageKind::from_extension(&self.extension)
    }
}

/// Parses object keys and checks their extension against an allow-set.
#[derive(Debug, Clone)]
pub struct KeyValidator {
    pattern: Regex,
    allowed_extensions: Vec<String>,
}

impl KeyValidator {
    pub fn new(allowed_extensions: Vec<String>) -> Result<Self, anyhow::Error> {
        let pattern =
            Regex::new(KEY_PATTERN).context("Failed to compile object key pattern")?;
        Ok(Self {
            pattern,
            allowed_extensions,
        })
    }

    /// Validator accepting the default extensions.
    pub fn with_default_extensions() -> Result<Self, anyhow::Error> {
        Self::new(ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Split `key` and check its extension. Matching is case-sensitive.
    pub fn validate(&self, key: &str) -> Result<ParsedKey, Rejection> {
        let captures = self
            .pattern
            .captures(key)
            .ok_or_else(|| Rejection::MalformedKey {
                key: key.to_string(),
            })?;

        let group = |i: usize| {
            captures
                .get(i)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        let parsed = ParsedKey {
            path_prefix: group(1),
            base_name: group(2),
            extension: group(3),
        };

        if !self.allowed_extensions.contains(&parsed.extension) {
            return Err(Rejection::UnsupportedType {
                file_name: parsed.base_name,
                extension: parsed.extension,
            });
        }

        Ok(parsed)
    }
}
