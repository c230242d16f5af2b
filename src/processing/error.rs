use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Raw file not found: {0}")]
    RawFileNotFound(PathBuf),

    #[error("Missing required columns in raw data: {missing:?}")]
    MissingColumns { missing: Vec<String> },

    #[error("Failed to create processed directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Raw file path has no usable file name: '{0}'")]
    InvalidRawPath(PathBuf),

    #[error("I/O error reading CSV file '{0}'")]
    CsvReadIo(PathBuf, #[source] std::io::Error),

    #[error("Parsing error reading CSV file '{0}'")]
    CsvReadPolars(PathBuf, #[source] PolarsError),

    #[error("I/O error writing processed dataset '{0}'")]
    CsvWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing processed dataset '{0}'")]
    CsvWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
