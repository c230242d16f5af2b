use chrono::NaiveDate;
use polars::error::PolarsError;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause of a failed round trip, as reported by a [`crate::Transport`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ArchiveError {
    // Transient: timeouts, refused connections, resets
    #[error("Network request failed for {url}")]
    NetworkRequest {
        url: String,
        #[source]
        source: BoxError,
    },

    // Transient: 429 and 5xx gateway/server statuses
    #[error("Temporary archive error for {url}: status {status} - {body_excerpt}")]
    TransientStatus {
        url: String,
        status: StatusCode,
        body_excerpt: String,
    },

    #[error("HTTP request failed for {url} with status {status}: {body_excerpt}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        body_excerpt: String,
    },

    #[error("Archive request for {url} failed after {attempts} attempts")]
    RetryExhausted {
        url: String,
        attempts: u32,
        #[source]
        last_error: Box<ArchiveError>,
    },

    #[error("Failed to decode JSON response from {url}")]
    JsonDecode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected archive response format: missing '{key}' (top-level keys: {keys:?})")]
    UnexpectedFormat { key: String, keys: Vec<String> },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to check raw file '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing raw dataset '{0}'")]
    CsvWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing raw dataset '{0}'")]
    CsvWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to assemble raw dataset for city '{city}'")]
    FrameAssembly {
        city: String,
        #[source]
        source: PolarsError,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ArchiveError {
    /// Whether a retry of the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ArchiveError::NetworkRequest { .. } | ArchiveError::TransientStatus { .. }
        )
    }
}
