//! Error types module
//!
//! The pipeline distinguishes two failure classes. A [`Rejection`] is an expected
//! input condition (a key we do not handle): it is logged and the invocation ends
//! with an empty success value. Everything else is a fault: logged, then returned
//! to the invoking runtime, whose retry policy applies.
//!
//! Each layer owns its error enum; all of them implement [`ErrorMetadata`] so the
//! orchestrator can log and classify them uniformly.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for internal detail
    Debug,
    /// Info level - for expected conditions like rejected keys
    Info,
    /// Warning level - for best-effort steps that failed without affecting the result
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Self-description of an error for logging and runtime signalling.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "UNSUPPORTED_TYPE")
    fn error_code(&self) -> &'static str;

    /// Whether a retry by the invoking platform could succeed
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Keys the pipeline declines to process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Unable to infer image type for key {key}")]
    MalformedKey { key: String },

    #[error("{file_name} has unsupported image type {extension}")]
    UnsupportedType { file_name: String, extension: String },
}

impl ErrorMetadata for Rejection {
    fn error_code(&self) -> &'static str {
        match self {
            Rejection::MalformedKey { .. } => "MALFORMED_KEY",
            Rejection::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Faults raised while reading the inbound notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("Notification contains no records")]
    NoRecords,

    #[error("Notification record is missing {0}")]
    MissingField(&'static str),

    #[error("Object key is not valid UTF-8 once decoded: {0}")]
    InvalidKeyEncoding(String),
}

impl ErrorMetadata for EventError {
    fn error_code(&self) -> &'static str {
        match self {
            EventError::NoRecords => "NO_RECORDS",
            EventError::MissingField(_) => "MISSING_FIELD",
            EventError::InvalidKeyEncoding(_) => "INVALID_KEY_ENCODING",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}
