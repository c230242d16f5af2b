// Raw dataset
pub const COL_DATE: &str = "date";
pub const COL_T_MAX: &str = "t_max";
pub const COL_T_MIN: &str = "t_min";
pub const COL_PRECIPITATION: &str = "precipitation";
pub const COL_WIND_MAX: &str = "wind_max";
pub const COL_CITY: &str = "city";

// Derived indicators
pub const COL_T_MEAN: &str = "t_mean";
pub const COL_HOT_DAY_30: &str = "hot_day_30";
pub const COL_HOT_DAY_35: &str = "hot_day_35";
pub const COL_HEAVY_RAIN_20: &str = "heavy_rain_20";

/// Column order of a raw dataset file.
pub const RAW_COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_T_MAX,
    COL_T_MIN,
    COL_PRECIPITATION,
    COL_WIND_MAX,
    COL_CITY,
];

/// Measured columns coerced to `Float64` before deriving indicators.
pub const NUMERIC_COLUMNS: [&str; 4] = [COL_T_MIN, COL_T_MAX, COL_PRECIPITATION, COL_WIND_MAX];

/// Boolean indicator columns appended by processing.
pub const INDICATOR_FLAGS: [&str; 3] = [COL_HOT_DAY_30, COL_HOT_DAY_35, COL_HEAVY_RAIN_20];
