use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of archive observations for a single location.
///
/// Every measured field is optional: the archive reports `null` for days
/// it has no data for, and those stay missing all the way to the processed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub t_max: Option<f64>,         // temperature_2m_max (°C)
    pub t_min: Option<f64>,         // temperature_2m_min (°C)
    pub precipitation: Option<f64>, // precipitation_sum (mm)
    pub wind_max: Option<f64>,      // wind_speed_10m_max (km/h)
}
