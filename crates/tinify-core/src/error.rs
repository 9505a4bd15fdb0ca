//! Error types module
//!
//! Every failure the optimization pipeline can surface is a variant of
//! [`TinifyError`]. Remote status codes are translated into these kinds at the
//! client boundary so callers never inspect raw HTTP responses.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Daily credit allowance reported alongside quota failures.
pub const DAILY_CREDIT_QUOTA: u32 = 20;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like bad caller input
    Debug,
    /// Warning level - for service-side rejections
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be reported to a caller.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "JOB_EXPIRED")
    fn error_code(&self) -> &'static str;

    /// HTTP status the remote service answered with, when the error came from one
    fn remote_status(&self) -> Option<u16>;

    /// Whether re-invoking the whole pipeline may succeed
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum TinifyError {
    #[error("{}", insufficient_credits_message(.remaining, .detail))]
    InsufficientCredits {
        remaining: u32,
        required: Option<u32>,
        detail: Option<String>,
    },

    #[error("File exceeds maximum size limit.")]
    ArtifactTooLarge { detail: Option<String> },

    #[error("Unsupported image format. Supported: JPEG, PNG, WebP, HEIC.")]
    UnsupportedFormat { status: u16, detail: Option<String> },

    #[error("Job has expired. Files are only available for a limited time.")]
    JobExpired,

    #[error("Job not completed yet.")]
    JobNotReady,

    #[error("Job not found.")]
    JobNotFound,

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),

    #[error("Processing timed out after {}.", format_duration(.timeout))]
    ProcessingTimedOut { timeout: Duration },

    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to fetch URL: {url} ({reason})")]
    FetchFailed { url: String, reason: String },

    #[error("{detail}")]
    RemoteRequestFailed { status: u16, detail: String },

    #[error("{0}")]
    Unrecoverable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for pipeline operations
pub type TinifyResult<T> = Result<T, TinifyError>;

fn insufficient_credits_message(remaining: &u32, detail: &Option<String>) -> String {
    format!(
        "Insufficient credits. {} of {} daily credits left. {}",
        remaining,
        DAILY_CREDIT_QUOTA,
        detail.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string()
}

fn format_duration(duration: &Duration) -> String {
    let millis = duration.as_millis();
    if millis == 1000 {
        "1 second".to_string()
    } else if millis % 1000 == 0 {
        format!("{} seconds", millis / 1000)
    } else {
        format!("{} ms", millis)
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn static_metadata(err: &TinifyError) -> (&'static str, bool, LogLevel) {
    match err {
        TinifyError::InsufficientCredits { .. } => {
            ("INSUFFICIENT_CREDITS", false, LogLevel::Warn)
        }
        TinifyError::ArtifactTooLarge { .. } => ("ARTIFACT_TOO_LARGE", false, LogLevel::Debug),
        TinifyError::UnsupportedFormat { .. } => ("UNSUPPORTED_FORMAT", false, LogLevel::Debug),
        TinifyError::JobExpired => ("JOB_EXPIRED", false, LogLevel::Warn),
        TinifyError::JobNotReady => ("JOB_NOT_READY", true, LogLevel::Warn),
        TinifyError::JobNotFound => ("JOB_NOT_FOUND", false, LogLevel::Warn),
        TinifyError::ProcessingFailed(_) => ("PROCESSING_FAILED", true, LogLevel::Warn),
        TinifyError::ProcessingError(_) => ("PROCESSING_ERROR", true, LogLevel::Warn),
        TinifyError::ProcessingTimedOut { .. } => ("PROCESSING_TIMED_OUT", true, LogLevel::Warn),
        TinifyError::InputNotFound(_) => ("INPUT_NOT_FOUND", false, LogLevel::Debug),
        TinifyError::FetchFailed { .. } => ("FETCH_FAILED", true, LogLevel::Warn),
        TinifyError::RemoteRequestFailed { status, .. } => {
            ("REMOTE_REQUEST_FAILED", *status >= 500, LogLevel::Error)
        }
        TinifyError::Unrecoverable(_) => ("UNRECOVERABLE", false, LogLevel::Error),
        TinifyError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        TinifyError::Transport(_) => ("TRANSPORT_ERROR", true, LogLevel::Error),
        TinifyError::Io(_) => ("IO_ERROR", false, LogLevel::Error),
    }
}

impl ErrorMetadata for TinifyError {
    fn error_code(&self) -> &'static str {
        static_metadata(self).0
    }

    fn remote_status(&self) -> Option<u16> {
        match self {
            TinifyError::InsufficientCredits { .. } => Some(429),
            TinifyError::ArtifactTooLarge { .. } => Some(413),
            TinifyError::UnsupportedFormat { status, .. } => Some(*status),
            TinifyError::JobExpired => Some(410),
            TinifyError::JobNotReady => Some(400),
            TinifyError::JobNotFound => Some(404),
            TinifyError::RemoteRequestFailed { status, .. } => Some(*status),
            TinifyError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    fn is_recoverable(&self) -> bool {
        static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).2
    }
}
