//! Aggregations over a processed frame, shaped for charting.
//!
//! All functions take the typed frame returned by [`crate::read_processed`] or
//! [`crate::PacaClimate::load`].

use crate::types::columns::{
    COL_CITY, COL_DATE, COL_HEAVY_RAIN_20, COL_HOT_DAY_30, COL_HOT_DAY_35, COL_PRECIPITATION,
    COL_T_MEAN,
};
use polars::prelude::*;

/// Number of days flagged by each indicator across the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorTotals {
    pub hot_days_30: IdxSize,
    pub hot_days_35: IdxSize,
    pub heavy_rain_days_20: IdxSize,
}

/// Number of `true` values; nulls are not counted.
fn count_true(df: &DataFrame, column: &str) -> PolarsResult<IdxSize> {
    Ok(df.column(column)?.bool()?.sum().unwrap_or(0))
}

pub fn indicator_totals(df: &DataFrame) -> PolarsResult<IndicatorTotals> {
    Ok(IndicatorTotals {
        hot_days_30: count_true(df, COL_HOT_DAY_30)?,
        hot_days_35: count_true(df, COL_HOT_DAY_35)?,
        heavy_rain_days_20: count_true(df, COL_HEAVY_RAIN_20)?,
    })
}

fn count_days(flag: &str, alias: &str) -> Expr {
    col(flag).cast(DataType::Int64).sum().alias(alias)
}

/// One row per calendar year: mean `t_mean`, total `precipitation`, and the
/// number of days at or above 30 °C and 35 °C.
///
/// With `city` set, only that city's rows are aggregated; otherwise all cities are pooled.
/// Output columns: `year`, `t_mean`, `precipitation`, `hot_days_30`, `hot_days_35`.
pub fn yearly_trends(df: &DataFrame, city: Option<&str>) -> PolarsResult<DataFrame> {
    let mut frame = df.clone().lazy();
    if let Some(city) = city {
        frame = frame.filter(col(COL_CITY).eq(lit(city)));
    }

    frame
        .group_by([col(COL_DATE).dt().year().alias("year")])
        .agg([
            col(COL_T_MEAN).mean(),
            col(COL_PRECIPITATION).sum(),
            count_days(COL_HOT_DAY_30, "hot_days_30"),
            count_days(COL_HOT_DAY_35, "hot_days_35"),
        ])
        .sort(["year"], SortMultipleOptions::default())
        .collect()
}

/// Mean of `value_column` per (date, city), sorted by date then city.
pub fn daily_city_means(df: &DataFrame, value_column: &str) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .group_by([col(COL_DATE), col(COL_CITY)])
        .agg([col(value_column).mean()])
        .sort([COL_DATE, COL_CITY], SortMultipleOptions::default())
        .collect()
}
