use crate::archive::error::ArchiveError;
use crate::processing::error::ProcessingError;
use crate::settings::SettingsError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimateError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to summarise processed data")]
    Summary(#[from] PolarsError),

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}
