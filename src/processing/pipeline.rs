//! Raw CSV → validated, sorted, indicator-enriched CSV.

use crate::processing::error::ProcessingError;
use crate::processing::indicators::{coerce_numeric, with_indicators};
use crate::processing::schema::validate_raw_schema;
use crate::types::columns::{COL_CITY, COL_DATE, COL_T_MEAN, INDICATOR_FLAGS};
use crate::utils::ensure_dir_exists;
use log::info;
use polars::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::{fs, task};

const PROCESSED_SUFFIX: &str = "_processed";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date_column() -> Expr {
    col(COL_DATE).str().to_date(StrptimeOptions {
        format: Some(DATE_FORMAT.into()),
        strict: false,
        exact: true,
        cache: true,
    })
}

/// Path of the processed file derived from `raw_path`, inside `processed_dir`.
pub fn processed_file_path(
    processed_dir: &Path,
    raw_path: &Path,
) -> Result<PathBuf, ProcessingError> {
    let stem = raw_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProcessingError::InvalidRawPath(raw_path.to_path_buf()))?;
    Ok(processed_dir.join(format!("{stem}{PROCESSED_SUFFIX}.csv")))
}

/// Validates, cleans and enriches a raw dataset read as text.
///
/// Rows without a parsable `date` or without a `city` are dropped, the rest are sorted
/// by city then date, and the indicator columns are appended.
pub fn process_frame(raw: DataFrame) -> Result<DataFrame, ProcessingError> {
    validate_raw_schema(&raw)?;

    let cleaned = raw
        .lazy()
        .with_column(parse_date_column())
        .filter(col(COL_DATE).is_not_null().and(col(COL_CITY).is_not_null()))
        .sort(
            [COL_CITY, COL_DATE],
            SortMultipleOptions::default().with_maintain_order(true),
        );

    Ok(with_indicators(cleaned).collect()?)
}

/// Reads a CSV file with every column kept as text.
async fn read_csv_as_text(path: &Path) -> Result<DataFrame, ProcessingError> {
    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path_buf.clone()))
            .map_err(|e| ProcessingError::CsvReadPolars(path_buf.clone(), e))?
            .finish()
            .map_err(|e| ProcessingError::CsvReadPolars(path_buf, e))
    })
    .await?
}

async fn write_csv(mut df: DataFrame, path: &Path) -> Result<(), ProcessingError> {
    let path_buf = path.to_path_buf();
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    task::spawn_blocking(move || {
        let mut temp_file = NamedTempFile::new_in(&dir)
            .map_err(|e| ProcessingError::CsvWriteIo(path_buf.clone(), e))?;
        CsvWriter::new(temp_file.as_file_mut())
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| ProcessingError::CsvWritePolars(path_buf.clone(), e))?;
        temp_file
            .persist(&path_buf)
            .map_err(|e| ProcessingError::CsvWriteIo(path_buf.clone(), e.error))?;
        Ok::<(), ProcessingError>(())
    })
    .await??;
    Ok(())
}

/// Loads a processed CSV back into a typed frame.
///
/// `date` becomes a `Date`, measured values and `t_mean` `Float64`, and the
/// indicator flags `Boolean`.
pub async fn read_processed(path: &Path) -> Result<DataFrame, ProcessingError> {
    let text = read_csv_as_text(path).await?;
    let flags: Vec<Expr> = INDICATOR_FLAGS
        .iter()
        .map(|name| col(*name).eq(lit("true")).fill_null(lit(false)).alias(*name))
        .collect();

    let typed = coerce_numeric(text.lazy())
        .with_columns([
            parse_date_column(),
            col(COL_T_MEAN).cast(DataType::Float64),
        ])
        .with_columns(flags)
        .collect()?;
    Ok(typed)
}

/// Turns raw dataset files into processed ones under a fixed directory.
#[derive(Debug, Clone)]
pub struct ProcessingPipeline {
    processed_dir: PathBuf,
}

impl ProcessingPipeline {
    pub fn new(processed_dir: &Path) -> Self {
        Self {
            processed_dir: processed_dir.to_path_buf(),
        }
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Processes `raw_path` and returns the path of the processed file.
    ///
    /// The output is always rewritten, even if it already exists.
    ///
    /// # Errors
    ///
    /// * [`ProcessingError::RawFileNotFound`] if `raw_path` is not an existing file.
    /// * [`ProcessingError::MissingColumns`] if the raw header lacks a required column.
    pub async fn process(&self, raw_path: &Path) -> Result<PathBuf, ProcessingError> {
        match fs::metadata(raw_path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(ProcessingError::RawFileNotFound(raw_path.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProcessingError::RawFileNotFound(raw_path.to_path_buf()))
            }
            Err(e) => return Err(ProcessingError::CsvReadIo(raw_path.to_path_buf(), e)),
        }

        info!("Reading raw data: {:?}", raw_path);
        let raw = read_csv_as_text(raw_path).await?;
        let processed = process_frame(raw)?;

        let out_file = processed_file_path(&self.processed_dir, raw_path)?;
        ensure_dir_exists(&self.processed_dir)
            .await
            .map_err(|e| ProcessingError::DataDirCreation(self.processed_dir.clone(), e))?;

        let rows = processed.height();
        write_csv(processed, &out_file).await?;
        info!("Processed data saved: {:?} (rows={})", out_file, rows);
        Ok(out_file)
    }
}
