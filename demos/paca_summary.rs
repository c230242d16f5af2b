//! Downloads the default period for the six PACA cities and prints indicator summaries.
//!
//! `LOG_LEVEL` sets the log level; `RUST_LOG` overrides it.

use paca_climate::{
    indicator_totals, yearly_trends, ClimateConfig, ClimateError, PacaClimate, Settings,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), ClimateError> {
    let settings = Settings::from_env()?;
    env_logger::Builder::new()
        .filter_level(settings.log_level)
        .parse_default_env()
        .init();
    configure_polars_display();

    let climate = PacaClimate::new(ClimateConfig::from_settings(&settings))?;
    let frame = climate
        .load(settings.default_start, settings.default_end)
        .await?;

    println!("{}", frame.head(Some(10)));

    let totals = indicator_totals(&frame)?;
    println!(
        "{} to {}: {} days >= 30°C, {} days >= 35°C, {} days >= 20 mm rain",
        settings.default_start,
        settings.default_end,
        totals.hot_days_30,
        totals.hot_days_35,
        totals.heavy_rain_days_20
    );

    let yearly = yearly_trends(&frame, None)?;
    println!("{}", yearly);

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
