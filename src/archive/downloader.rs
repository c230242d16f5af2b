//! Downloads every registry city into one raw CSV per date range.

use crate::archive::daily_fetcher::DailySeriesFetcher;
use crate::archive::error::ArchiveError;
use crate::archive::transport::Transport;
use crate::types::columns::{
    COL_CITY, COL_DATE, COL_PRECIPITATION, COL_T_MAX, COL_T_MIN, COL_WIND_MAX,
};
use crate::types::location::{Location, PACA_CITIES};
use crate::types::observation::DailyObservation;
use crate::utils::ensure_dir_exists;
use chrono::NaiveDate;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::{fs, task};

const RAW_FILE_PREFIX: &str = "openmeteo_paca";

/// Path of the raw dataset for `start..=end` inside `raw_dir`.
pub fn raw_file_path(raw_dir: &Path, start: NaiveDate, end: NaiveDate) -> PathBuf {
    raw_dir.join(format!(
        "{}_{}_{}.csv",
        RAW_FILE_PREFIX,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    ))
}

pub struct MultiCityDownloader<T> {
    fetcher: DailySeriesFetcher<T>,
    raw_dir: PathBuf,
    timezone: String,
    locations: Vec<Location>,
}

impl<T: Transport> MultiCityDownloader<T> {
    /// Creates a downloader over [`PACA_CITIES`].
    pub fn new(fetcher: DailySeriesFetcher<T>, raw_dir: &Path, timezone: &str) -> Self {
        Self {
            fetcher,
            raw_dir: raw_dir.to_path_buf(),
            timezone: timezone.to_string(),
            locations: PACA_CITIES.to_vec(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Downloads every city for `start..=end` and writes them to one raw CSV.
    ///
    /// If the file for this range already exists and `force_download` is false, its path
    /// is returned without any network traffic. Cities are fetched one after another in
    /// registry order; the first failing city aborts the download and nothing is written.
    pub async fn download_all(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        force_download: bool,
    ) -> Result<PathBuf, ArchiveError> {
        if start > end {
            return Err(ArchiveError::InvalidDateRange { start, end });
        }

        let out_file = raw_file_path(&self.raw_dir, start, end);
        let exists = fs::try_exists(&out_file)
            .await
            .map_err(|e| ArchiveError::CacheMetadataRead(out_file.clone(), e))?;
        if exists && !force_download {
            info!("Raw file already exists, reusing: {:?}", out_file);
            return Ok(out_file);
        }

        ensure_dir_exists(&self.raw_dir)
            .await
            .map_err(|e| ArchiveError::DataDirCreation(self.raw_dir.clone(), e))?;

        let mut full: Option<DataFrame> = None;
        for location in &self.locations {
            let observations = self
                .fetcher
                .fetch_daily(
                    location.latitude,
                    location.longitude,
                    start,
                    end,
                    &self.timezone,
                )
                .await?;
            let city_frame = observations_to_frame(location.name, &observations)?;
            match full.as_mut() {
                Some(frame) => {
                    frame
                        .vstack_mut(&city_frame)
                        .map_err(|e| ArchiveError::FrameAssembly {
                            city: location.name.to_string(),
                            source: e,
                        })?;
                }
                None => full = Some(city_frame),
            }
        }

        let full = match full {
            Some(frame) => frame,
            None => observations_to_frame("", &[])?,
        };
        let rows = full.height();
        write_raw_csv(full, &self.raw_dir, &out_file).await?;
        info!("Saved raw data to {:?} (rows={})", out_file, rows);
        Ok(out_file)
    }
}

/// Builds the raw-dataset rows of one city, tagging each with `city`.
pub fn observations_to_frame(
    city: &str,
    observations: &[DailyObservation],
) -> Result<DataFrame, ArchiveError> {
    let dates: Vec<NaiveDate> = observations.iter().map(|o| o.date).collect();
    let t_max: Vec<Option<f64>> = observations.iter().map(|o| o.t_max).collect();
    let t_min: Vec<Option<f64>> = observations.iter().map(|o| o.t_min).collect();
    let precipitation: Vec<Option<f64>> = observations.iter().map(|o| o.precipitation).collect();
    let wind_max: Vec<Option<f64>> = observations.iter().map(|o| o.wind_max).collect();
    let cities: Vec<&str> = vec![city; observations.len()];

    df!(
        COL_DATE => dates,
        COL_T_MAX => t_max,
        COL_T_MIN => t_min,
        COL_PRECIPITATION => precipitation,
        COL_WIND_MAX => wind_max,
        COL_CITY => cities
    )
    .map_err(|e| ArchiveError::FrameAssembly {
        city: city.to_string(),
        source: e,
    })
}

/// Writes the raw frame next to its destination and renames it into place.
async fn write_raw_csv(
    mut df: DataFrame,
    raw_dir: &Path,
    out_file: &Path,
) -> Result<(), ArchiveError> {
    let dir = raw_dir.to_path_buf();
    let path_buf = out_file.to_path_buf();
    task::spawn_blocking(move || {
        let mut temp_file = NamedTempFile::new_in(&dir)
            .map_err(|e| ArchiveError::CsvWriteIo(path_buf.clone(), e))?;
        CsvWriter::new(temp_file.as_file_mut())
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| ArchiveError::CsvWritePolars(path_buf.clone(), e))?;
        temp_file
            .persist(&path_buf)
            .map_err(|e| ArchiveError::CsvWriteIo(path_buf.clone(), e.error))?;
        Ok::<(), ArchiveError>(())
    })
    .await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::http_client::{RetryPolicy, RetryingClient};
    use crate::archive::mock_transport::{daily_payload, MockTransport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn downloader(transport: MockTransport, raw_dir: &Path) -> MultiCityDownloader<MockTransport> {
        let policy = RetryPolicy {
            max_retries: 2,
            backoff_base: 1.0,
            timeout: Duration::from_secs(1),
        };
        let fetcher =
            DailySeriesFetcher::new(RetryingClient::new(transport, policy), "http://archive.test");
        MultiCityDownloader::new(fetcher, raw_dir, "Europe/Paris")
    }

    /// Serves a payload for whatever range the request asks for.
    fn range_transport() -> MockTransport {
        MockTransport::new(|_, query| {
            let param = |name: &str| {
                query
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| NaiveDate::parse_from_str(v, "%Y-%m-%d").unwrap())
                    .unwrap()
            };
            let body = daily_payload(param("start_date"), param("end_date"), 30.0);
            MockTransport::status(200, &body)
        })
    }

    fn read_raw(path: &Path) -> DataFrame {
        CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .unwrap()
            .finish()
            .unwrap()
    }

    #[test]
    fn test_raw_file_path_embeds_range() {
        let path = raw_file_path(Path::new("data/raw"), date(2013, 1, 1), date(2023, 12, 31));
        assert_eq!(
            path,
            PathBuf::from("data/raw/openmeteo_paca_2013-01-01_2023-12-31.csv")
        );
    }

    #[tokio::test]
    async fn test_download_concatenates_cities_in_registry_order() -> Result<(), ArchiveError> {
        let dir = tempfile::tempdir().unwrap();
        let raw_dir = dir.path().join("raw");
        let transport = range_transport();
        let downloader = downloader(transport.clone(), &raw_dir);
        assert_eq!(downloader.raw_dir(), raw_dir.as_path());

        let path = downloader
            .download_all(date(2022, 6, 1), date(2022, 6, 3), false)
            .await?;
        assert_eq!(path.parent(), Some(downloader.raw_dir()));

        assert_eq!(transport.calls(), PACA_CITIES.len());
        let df = read_raw(&path);
        assert_eq!(df.height(), 3 * PACA_CITIES.len());
        let columns: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
        assert_eq!(
            columns,
            ["date", "t_max", "t_min", "precipitation", "wind_max", "city"]
        );

        let cities: Vec<String> = df
            .column(COL_CITY)
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .map(str::to_string)
            .collect();
        let expected: Vec<String> = PACA_CITIES
            .iter()
            .flat_map(|l| std::iter::repeat(l.name.to_string()).take(3))
            .collect();
        assert_eq!(cities, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_download_is_cache_hit() -> Result<(), ArchiveError> {
        let dir = tempfile::tempdir().unwrap();
        let transport = range_transport();
        let downloader = downloader(transport.clone(), dir.path());

        let first = downloader
            .download_all(date(2021, 1, 1), date(2021, 1, 2), false)
            .await?;
        let second = downloader
            .download_all(date(2021, 1, 1), date(2021, 1, 2), false)
            .await?;

        assert_eq!(first, second);
        assert_eq!(transport.calls(), PACA_CITIES.len());
        Ok(())
    }

    #[tokio::test]
    async fn test_force_download_refetches() -> Result<(), ArchiveError> {
        let dir = tempfile::tempdir().unwrap();
        let transport = range_transport();
        let downloader = downloader(transport.clone(), dir.path());

        downloader
            .download_all(date(2021, 1, 1), date(2021, 1, 2), false)
            .await?;
        downloader
            .download_all(date(2021, 1, 1), date(2021, 1, 2), true)
            .await?;

        assert_eq!(transport.calls(), 2 * PACA_CITIES.len());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failing_city_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let served = Arc::new(AtomicUsize::new(0));
        let served_in = served.clone();
        let body = daily_payload(date(2020, 5, 1), date(2020, 5, 2), 25.0);
        // Third city (Toulon) always answers 404.
        let transport = MockTransport::new(move |_, query| {
            let lat = &query[0].1;
            if lat == "43.1242" {
                return MockTransport::status(404, "not found");
            }
            served_in.fetch_add(1, Ordering::SeqCst);
            MockTransport::status(200, &body)
        });
        let downloader = downloader(transport.clone(), dir.path());

        let err = downloader
            .download_all(date(2020, 5, 1), date(2020, 5, 2), false)
            .await
            .unwrap_err();

        assert!(matches!(err, ArchiveError::HttpStatus { .. }));
        assert_eq!(served.load(Ordering::SeqCst), 2);
        assert_eq!(transport.calls(), 3);
        let path = raw_file_path(dir.path(), date(2020, 5, 1), date(2020, 5, 2));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_reversed_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let transport = range_transport();
        let downloader = downloader(transport.clone(), dir.path());

        let err = downloader
            .download_all(date(2021, 2, 1), date(2021, 1, 1), false)
            .await
            .unwrap_err();

        assert!(matches!(err, ArchiveError::InvalidDateRange { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_observations_to_frame_keeps_missing_values() {
        let rows = vec![DailyObservation {
            date: date(2020, 1, 1),
            t_max: None,
            t_min: Some(1.0),
            precipitation: None,
            wind_max: Some(12.0),
        }];
        let df = observations_to_frame("Gap", &rows).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.column(COL_T_MAX).unwrap().null_count(), 1);
        assert_eq!(df.column(COL_DATE).unwrap().dtype(), &DataType::Date);
    }
}
