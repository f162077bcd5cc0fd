//! Upload notification model
//!
//! Notifications arrive as [`S3Event`]. [`UploadEvent`] is the validated, decoded
//! form handed to the pipeline: exactly one bucket and key.

use aws_lambda_events::s3::S3Event;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::DESTINATION_BUCKET_SUFFIX;
use crate::error::EventError;

/// A bucket/key pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl Display for ObjectLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// The upload the pipeline processes in one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub source_bucket: String,
    pub source_key: String,
}

impl UploadEvent {
    pub fn new(source_bucket: impl Into<String>, source_key: impl Into<String>) -> Self {
        Self {
            source_bucket: source_bucket.into(),
            source_key: source_key.into(),
        }
    }

    /// Extract the upload from a notification.
    ///
    /// Only the first record is processed; any further records are ignored.
    pub fn from_notification(notification: &S3Event) -> Result<Self, EventError> {
        tracing::info!(
            records = notification.records.len(),
            "Images uploaded event accepted"
        );

        let record = notification.records.first().ok_or(EventError::NoRecords)?;
        if notification.records.len() > 1 {
            tracing::warn!(
                ignored = notification.records.len() - 1,
                "Only the first notification record is processed"
            );
        }

        let bucket = record
            .s3
            .bucket
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(EventError::MissingField("bucket name"))?;

        let encoded_key = record
            .s3
            .object
            .key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(EventError::MissingField("object key"))?;

        let key = decode_object_key(encoded_key)?;
        if key.is_empty() {
            return Err(EventError::MissingField("object key"));
        }

        Ok(Self::new(bucket, key))
    }

    pub fn source(&self) -> ObjectLocation {
        ObjectLocation::new(&self.source_bucket, &self.source_key)
    }

    pub fn destination_bucket(&self) -> String {
        format!("{}{}", self.source_bucket, DESTINATION_BUCKET_SUFFIX)
    }

    /// Same key as the source, in the `-resized` sibling bucket.
    pub fn destination(&self) -> ObjectLocation {
        ObjectLocation::new(self.destination_bucket(), &self.source_key)
    }
}

/// Decode an S3 notification key: `+` encodes a space, the rest is percent-encoded.
///
/// `S3Object::url_decoded_key` is not populated on deserialization, so keys are
/// always decoded here.
pub fn decode_object_key(encoded: &str) -> Result<String, EventError> {
    let spaced = encoded.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| EventError::InvalidKeyEncoding(encoded.to_string()))
}
