//! Shared error type across QuakeWatch crates.

use thiserror::Error;

/// Stable error kinds (used as the `error_type` metric label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Inbound payload is not a JSON object of the expected shape.
    MalformedPayload,
    /// Negative or NaN counter increment.
    InvalidDelta,
    /// Histogram bounds are not finite and strictly ascending.
    InvalidBuckets,
    /// Histogram bounds differ from the ones fixed at first use.
    BucketMismatch,
    /// Metric name reused with a different kind.
    KindMismatch,
    /// Alert log sink could not be written.
    SinkWrite,
    /// Invalid configuration.
    Config,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ErrorKind {
    /// String representation used in metric labels and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MalformedPayload => "malformed_payload",
            ErrorKind::InvalidDelta => "invalid_delta",
            ErrorKind::InvalidBuckets => "invalid_buckets",
            ErrorKind::BucketMismatch => "bucket_mismatch",
            ErrorKind::KindMismatch => "kind_mismatch",
            ErrorKind::SinkWrite => "sink_write",
            ErrorKind::Config => "config",
            ErrorKind::UnsupportedVersion => "unsupported_version",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, QuakeWatchError>;

/// Unified error type used by core and receiver.
#[derive(Debug, Error)]
pub enum QuakeWatchError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("counter {name} cannot be incremented by {delta}")]
    InvalidDelta { name: String, delta: f64 },
    #[error("histogram {0} buckets must be finite and strictly ascending")]
    InvalidBuckets(String),
    #[error("histogram {0} observed with buckets that differ from its first use")]
    BucketMismatch(String),
    #[error("metric {name} is a {existing}, not a {requested}")]
    KindMismatch {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },
    #[error("alert log write failed: {0}")]
    SinkWrite(String),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl QuakeWatchError {
    /// Map the error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuakeWatchError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            QuakeWatchError::InvalidDelta { .. } => ErrorKind::InvalidDelta,
            QuakeWatchError::InvalidBuckets(_) => ErrorKind::InvalidBuckets,
            QuakeWatchError::BucketMismatch(_) => ErrorKind::BucketMismatch,
            QuakeWatchError::KindMismatch { .. } => ErrorKind::KindMismatch,
            QuakeWatchError::SinkWrite(_) => ErrorKind::SinkWrite,
            QuakeWatchError::Config(_) => ErrorKind::Config,
            QuakeWatchError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            QuakeWatchError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<std::io::Error> for QuakeWatchError {
    fn from(e: std::io::Error) -> Self {
        QuakeWatchError::SinkWrite(e.to_string())
    }
}
