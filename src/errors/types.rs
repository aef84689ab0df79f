//! Error type definitions for the emote proxy
//!
//! The hierarchy mirrors the propagation policy: `IngestError` is caught at
//! the batch boundary and converted into item omission plus a log record;
//! `StoreError::Unavailable` is fatal to listing requests but not to sibling
//! batch items; `CacheError` is never fatal anywhere.

use thiserror::Error;

/// Errors crossing the outbound HTTP boundary (directory and CDN fetches)
#[derive(Error, Debug)]
pub enum AppError {
    /// External service errors
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AppError {
    /// Shorthand for upstream directory failures
    pub fn upstream_error(message: impl Into<String>) -> Self {
        AppError::ExternalService {
            service: "7tv".to_string(),
            message: message.into(),
        }
    }
}

/// Image transcoding errors
///
/// `Decode` marks input the pipeline cannot parse; it is the per-item
/// failure class that batch ingestion tolerates.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Source bytes could not be decoded as an image
    #[error("image decode failed: {message}")]
    Decode { message: String },

    /// Re-encoding the normalized frames failed
    #[error("image encode failed: {message}")]
    Encode { message: String },
}

/// Blob store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store is unreachable or rejected the operation
    #[error("blob store unavailable: {message}")]
    Unavailable { message: String },

    /// A blob name that cannot be mapped onto the backing namespace
    #[error("invalid blob name: {name}")]
    InvalidName { name: String },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Unavailable {
            message: err.to_string(),
        }
    }
}

/// Key-value cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache store is unreachable
    #[error("cache unavailable: {message}")]
    Unavailable { message: String },

    /// An invalidation pattern that does not compile
    #[error("invalid cache pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Per-emote ingestion failures
///
/// Every variant carries the emote name so the batch log record identifies
/// the dropped item. These never propagate past the batch boundary.
#[derive(Error, Debug)]
pub enum IngestError {
    /// No usable image variant was offered upstream
    #[error("no usable variant for emote '{emote}'")]
    SelectionEmpty { emote: String },

    /// Downloading the chosen variant failed (non-2xx or network error)
    #[error("fetch failed for emote '{emote}': {message}")]
    Fetch { emote: String, message: String },

    /// The chosen variant could not be normalized
    #[error("transcode failed for emote '{emote}': {source}")]
    Transcode {
        emote: String,
        #[source]
        source: TranscodeError,
    },

    /// Persisting the normalized bytes failed
    #[error("store failed for emote '{emote}': {source}")]
    Store {
        emote: String,
        #[source]
        source: StoreError,
    },
}
