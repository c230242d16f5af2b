use crate::archive::error::ArchiveError;
use crate::archive::http_client::RetryingClient;
use crate::archive::transport::{QueryParams, Transport};
use crate::types::observation::DailyObservation;
use chrono::NaiveDate;
use log::{error, info};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

const DAILY_FIELDS: [&str; 4] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "wind_speed_10m_max",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The `daily` block of an archive response: parallel arrays aligned on `time`.
#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<Value>,
    #[serde(rename = "temperature_2m_max", default, deserialize_with = "lenient_array")]
    t_max: Vec<Value>,
    #[serde(rename = "temperature_2m_min", default, deserialize_with = "lenient_array")]
    t_min: Vec<Value>,
    #[serde(rename = "precipitation_sum", default, deserialize_with = "lenient_array")]
    precipitation: Vec<Value>,
    #[serde(rename = "wind_speed_10m_max", default, deserialize_with = "lenient_array")]
    wind_max: Vec<Value>,
}

/// A field that is `null` or not an array reads as empty, so all of its values go missing.
fn lenient_array<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values,
        _ => Vec::new(),
    })
}

/// Fetches one location's daily series from the archive.
pub struct DailySeriesFetcher<T> {
    client: RetryingClient<T>,
    archive_url: String,
}

impl<T: Transport> DailySeriesFetcher<T> {
    pub fn new(client: RetryingClient<T>, archive_url: impl Into<String>) -> Self {
        Self {
            client,
            archive_url: archive_url.into(),
        }
    }

    /// Returns the observations for `start..=end` in the order the archive lists them.
    ///
    /// Days whose date does not parse are dropped. Measured values that are null or
    /// not numbers come back as `None`.
    pub async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
        timezone: &str,
    ) -> Result<Vec<DailyObservation>, ArchiveError> {
        let query = daily_query(latitude, longitude, start, end, timezone);
        info!(
            "Fetching archive daily data lat={:.4} lon={:.4} ({} -> {})",
            latitude, longitude, start, end
        );

        let payload = self.client.get_json(&self.archive_url, &query).await?;
        let observations = parse_daily(payload)?;

        info!("Fetched {} rows.", observations.len());
        Ok(observations)
    }
}

fn daily_query(
    latitude: f64,
    longitude: f64,
    start: NaiveDate,
    end: NaiveDate,
    timezone: &str,
) -> QueryParams {
    vec![
        ("latitude", latitude.to_string()),
        ("longitude", longitude.to_string()),
        ("start_date", start.format(DATE_FORMAT).to_string()),
        ("end_date", end.format(DATE_FORMAT).to_string()),
        ("daily", DAILY_FIELDS.join(",")),
        ("timezone", timezone.to_string()),
    ]
}

fn top_level_keys(payload: &Value) -> Vec<String> {
    payload
        .as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

fn unexpected_format(key: &str, payload: &Value) -> ArchiveError {
    let keys = top_level_keys(payload);
    error!("Unexpected archive response format: keys={:?}", keys);
    ArchiveError::UnexpectedFormat {
        key: key.to_string(),
        keys,
    }
}

fn parse_daily(mut payload: Value) -> Result<Vec<DailyObservation>, ArchiveError> {
    let has_time = payload
        .get("daily")
        .and_then(|daily| daily.get("time"))
        .is_some_and(Value::is_array);
    if !has_time {
        let key = if payload.get("daily").is_some_and(Value::is_object) {
            "daily.time"
        } else {
            "daily"
        };
        return Err(unexpected_format(key, &payload));
    }

    let daily = payload["daily"].take();
    let block: DailyBlock = match serde_json::from_value(daily) {
        Ok(block) => block,
        Err(_) => return Err(unexpected_format("daily", &payload)),
    };

    let observations = block
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, time)| {
            let date = time
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())?;
            Some(DailyObservation {
                date,
                t_max: number_at(&block.t_max, i),
                t_min: number_at(&block.t_min, i),
                precipitation: number_at(&block.precipitation, i),
                wind_max: number_at(&block.wind_max, i),
            })
        })
        .collect();
    Ok(observations)
}

fn number_at(values: &[Value], idx: usize) -> Option<f64> {
    values.get(idx).and_then(Value::as_f64)
}
