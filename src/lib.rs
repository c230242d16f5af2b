mod archive;
mod climate;
mod error;
mod processing;
mod settings;
mod summary;
mod types;
mod utils;

pub use climate::*;
pub use error::ClimateError;

pub use archive::daily_fetcher::{DailySeriesFetcher, ARCHIVE_URL};
pub use archive::downloader::{raw_file_path, MultiCityDownloader};
pub use archive::error::{ArchiveError, BoxError};
pub use archive::http_client::{RetryPolicy, RetryingClient};
pub use archive::transport::{QueryParams, RawResponse, ReqwestTransport, Transport};

pub use processing::error::ProcessingError;
pub use processing::indicators::{
    coerce_numeric, derive_indicators, with_indicators, HEAVY_RAIN_THRESHOLD, HOT_DAY_30_THRESHOLD,
    HOT_DAY_35_THRESHOLD,
};
pub use processing::pipeline::{
    process_frame, processed_file_path, read_processed, ProcessingPipeline,
};
pub use processing::schema::validate_raw_schema;

pub use settings::{Settings, SettingsError};
pub use summary::*;

pub use types::columns;
pub use types::location::{location_by_name, Location, PACA_CITIES};
pub use types::observation::DailyObservation;
