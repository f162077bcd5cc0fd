//! Fixed conventions of the thumbnail pipeline.

/// Suffix appended to the source bucket name to obtain the destination bucket.
pub const DESTINATION_BUCKET_SUFFIX: &str = "-resized";

/// Default edge length of a derivative, in pixels.
pub const DEFAULT_TARGET_SIZE: u32 = 400;

/// Extensions accepted by the key validator. Matching is case-sensitive.
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Prefix of every derivative content type.
pub const CONTENT_TYPE_PREFIX: &str = "image/";

/// Signal returned to the runtime when a derivative was stored.
pub const SUCCESS_SIGNAL: &str = "Ok";

/// Signal returned to the runtime when the upload was skipped.
pub const REJECTED_SIGNAL: &str = "";
