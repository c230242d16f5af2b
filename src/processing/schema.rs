use crate::processing::error::ProcessingError;
use crate::types::columns::RAW_COLUMNS;
use polars::prelude::DataFrame;
use std::collections::BTreeSet;

/// Checks that `df` has every raw-dataset column.
///
/// On failure the missing column names are reported in sorted order.
pub fn validate_raw_schema(df: &DataFrame) -> Result<(), ProcessingError> {
    let present: BTreeSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    let missing: Vec<String> = RAW_COLUMNS
        .iter()
        .copied()
        .collect::<BTreeSet<&str>>()
        .difference(&present)
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProcessingError::MissingColumns { missing })
    }
}
