//! Defaults read from the process environment.
//!
//! | variable             | default        |
//! |----------------------|----------------|
//! | `DEFAULT_START_DATE` | `2013-01-01`   |
//! | `DEFAULT_END_DATE`   | `2023-12-31`   |
//! | `APP_TIMEZONE`       | `Europe/Paris` |
//! | `LOG_LEVEL`          | `INFO`         |

use chrono::NaiveDate;
use log::LevelFilter;
use std::env;
use thiserror::Error;

pub const ENV_START_DATE: &str = "DEFAULT_START_DATE";
pub const ENV_END_DATE: &str = "DEFAULT_END_DATE";
pub const ENV_TIMEZONE: &str = "APP_TIMEZONE";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";
const DEFAULT_START: &str = "2013-01-01";
const DEFAULT_END: &str = "2023-12-31";
const DEFAULT_LOG_LEVEL: &str = "INFO";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid date '{value}' in {var} (expected YYYY-MM-DD)")]
    InvalidDate {
        var: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid log level '{value}' in {var}")]
    InvalidLogLevel { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
    pub timezone: String,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source; unset or empty variables
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str, default: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            default_start: parse_date(ENV_START_DATE, read(ENV_START_DATE, DEFAULT_START))?,
            default_end: parse_date(ENV_END_DATE, read(ENV_END_DATE, DEFAULT_END))?,
            timezone: read(ENV_TIMEZONE, DEFAULT_TIMEZONE),
            log_level: parse_level(read(ENV_LOG_LEVEL, DEFAULT_LOG_LEVEL))?,
        })
    }
}

fn parse_date(var: &'static str, value: String) -> Result<NaiveDate, SettingsError> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map_err(|source| SettingsError::InvalidDate { var, value, source })
}

fn parse_level(value: String) -> Result<LevelFilter, SettingsError> {
    // Accept the Python-style spellings as well.
    let normalized = match value.to_ascii_uppercase().as_str() {
        "WARNING" => "WARN".to_string(),
        "CRITICAL" => "ERROR".to_string(),
        other => other.to_string(),
    };
    normalized
        .parse()
        .map_err(|_| SettingsError::InvalidLogLevel {
            var: ENV_LOG_LEVEL,
            value,
        })
}
