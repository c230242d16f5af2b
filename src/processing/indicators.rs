//! Derived climate indicator columns.
//!
//! | column          | definition                    |
//! |-----------------|-------------------------------|
//! | `t_mean`        | `(t_min + t_max) / 2`         |
//! | `hot_day_30`    | `t_max >= 30 °C`              |
//! | `hot_day_35`    | `t_max >= 35 °C`              |
//! | `heavy_rain_20` | `precipitation >= 20 mm`      |
//!
//! `t_mean` is null whenever either operand is null. A flag whose input is null is
//! `false`, so the flag columns never contain nulls.

use crate::types::columns::{
    COL_HEAVY_RAIN_20, COL_HOT_DAY_30, COL_HOT_DAY_35, COL_PRECIPITATION, COL_T_MAX, COL_T_MEAN,
    COL_T_MIN, NUMERIC_COLUMNS,
};
use polars::prelude::*;

pub const HOT_DAY_30_THRESHOLD: f64 = 30.0;
pub const HOT_DAY_35_THRESHOLD: f64 = 35.0;
pub const HEAVY_RAIN_THRESHOLD: f64 = 20.0;

fn at_least(column: &str, threshold: f64) -> Expr {
    col(column).gt_eq(lit(threshold)).fill_null(lit(false))
}

/// Coerces the measured columns to `Float64`; values that don't parse become null.
pub fn coerce_numeric(frame: LazyFrame) -> LazyFrame {
    frame.with_columns(
        NUMERIC_COLUMNS
            .iter()
            .map(|name| col(*name).cast(DataType::Float64))
            .collect::<Vec<_>>(),
    )
}

/// Appends the indicator columns to a lazy frame with the raw schema.
pub fn with_indicators(frame: LazyFrame) -> LazyFrame {
    coerce_numeric(frame).with_columns([
        ((col(COL_T_MIN) + col(COL_T_MAX)) / lit(2.0)).alias(COL_T_MEAN),
        at_least(COL_T_MAX, HOT_DAY_30_THRESHOLD).alias(COL_HOT_DAY_30),
        at_least(COL_T_MAX, HOT_DAY_35_THRESHOLD).alias(COL_HOT_DAY_35),
        at_least(COL_PRECIPITATION, HEAVY_RAIN_THRESHOLD).alias(COL_HEAVY_RAIN_20),
    ])
}

/// Returns a copy of `df` with the indicator columns added.
///
/// `df` itself is left untouched. Original columns keep their values, apart from the
/// measured columns being coerced to `Float64`.
pub fn derive_indicators(df: &DataFrame) -> PolarsResult<DataFrame> {
    with_indicators(df.clone().lazy()).collect()
}
