//! Main entry point: download the PACA cities for a date range, process the raw file
//! and hand the resulting frame to whoever renders it.

use crate::archive::daily_fetcher::{DailySeriesFetcher, ARCHIVE_URL};
use crate::archive::downloader::MultiCityDownloader;
use crate::archive::http_client::{RetryPolicy, RetryingClient};
use crate::archive::transport::{ReqwestTransport, Transport};
use crate::error::ClimateError;
use crate::processing::pipeline::{read_processed, ProcessingPipeline};
use crate::settings::{Settings, DEFAULT_TIMEZONE};
use bon::{bon, Builder};
use chrono::NaiveDate;
use log::info;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
const RAW_SUBDIR: &str = "raw";
const PROCESSED_SUBDIR: &str = "processed";

/// Where files go and how the archive is queried.
///
/// # Examples
///
/// ```
/// use paca_climate::{ClimateConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = ClimateConfig::builder()
///     .data_dir("/tmp/paca".into())
///     .timezone("UTC".to_string())
///     .retry(RetryPolicy { max_retries: 5, backoff_base: 2.0, timeout: Duration::from_secs(60) })
///     .build();
/// assert_eq!(config.archive_url, "https://archive-api.open-meteo.com/v1/archive");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ClimateConfig {
    /// Root data directory; raw files go to `<data_dir>/raw`, processed ones to `<data_dir>/processed`.
    #[builder(default = PathBuf::from(DEFAULT_DATA_DIR))]
    pub data_dir: PathBuf,
    #[builder(default = String::from(ARCHIVE_URL))]
    pub archive_url: String,
    /// IANA timezone the archive aligns days to.
    #[builder(default = String::from(DEFAULT_TIMEZONE))]
    pub timezone: String,
    #[builder(default)]
    pub retry: RetryPolicy,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClimateConfig {
    /// Default configuration using the timezone from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::builder().timezone(settings.timezone.clone()).build()
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join(RAW_SUBDIR)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join(PROCESSED_SUBDIR)
    }
}

/// Downloads, processes and loads PACA daily weather.
///
/// ```no_run
/// # use paca_climate::{ClimateConfig, ClimateError, PacaClimate};
/// # use chrono::NaiveDate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), ClimateError> {
/// let climate = PacaClimate::new(ClimateConfig::default())?;
/// let frame = climate
///     .load(
///         NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2023, 8, 31).unwrap(),
///     )
///     .await?;
/// println!("{}", frame.head(Some(5)));
/// # Ok(())
/// # }
/// ```
pub struct PacaClimate<T = ReqwestTransport> {
    downloader: MultiCityDownloader<T>,
    pipeline: ProcessingPipeline,
}

impl PacaClimate<ReqwestTransport> {
    /// Creates a client that talks to the archive over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::HttpClient`] if the HTTP client cannot be initialised.
    pub fn new(config: ClimateConfig) -> Result<Self, ClimateError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .build()
            .map_err(ClimateError::HttpClient)?;
        Ok(Self::with_transport(config, ReqwestTransport::new(client)))
    }
}

#[bon]
impl<T: Transport> PacaClimate<T> {
    /// Creates a client on top of a custom [`Transport`].
    pub fn with_transport(config: ClimateConfig, transport: T) -> Self {
        let fetcher = DailySeriesFetcher::new(
            RetryingClient::new(transport, config.retry),
            config.archive_url.clone(),
        );
        Self {
            downloader: MultiCityDownloader::new(fetcher, &config.raw_dir(), &config.timezone),
            pipeline: ProcessingPipeline::new(&config.processed_dir()),
        }
    }

    /// Downloads the raw dataset for `start_date..=end_date`, reusing an existing file
    /// unless `.force_download(true)` is set.
    ///
    /// ```no_run
    /// # use paca_climate::{ClimateConfig, ClimateError, PacaClimate};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ClimateError> {
    /// let climate = PacaClimate::new(ClimateConfig::default())?;
    /// let raw = climate
    ///     .download()
    ///     .start_date(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap())
    ///     .end_date(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap())
    ///     .force_download(true)
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn download(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        force_download: Option<bool>,
    ) -> Result<PathBuf, ClimateError> {
        let force_download = force_download.unwrap_or(false);
        Ok(self
            .downloader
            .download_all(start_date, end_date, force_download)
            .await?)
    }

    /// Processes a raw dataset file and returns the processed file's path.
    pub async fn process(&self, raw_path: &Path) -> Result<PathBuf, ClimateError> {
        Ok(self.pipeline.process(raw_path).await?)
    }

    /// Download (cache-aware), process, and load the processed frame for a date range.
    pub async fn load(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<DataFrame, ClimateError> {
        let raw_path = self
            .download()
            .start_date(start_date)
            .end_date(end_date)
            .call()
            .await?;
        let processed_path = self.process(&raw_path).await?;
        let frame = read_processed(&processed_path).await?;
        info!(
            "Pipeline completed. Rows={} Cols={}",
            frame.height(),
            frame.width()
        );
        Ok(frame)
    }
}
