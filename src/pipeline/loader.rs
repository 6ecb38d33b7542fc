//! Dataset loader for CSV and Parquet files

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::*;

use super::error::DiagnosticsError;
use super::table::column_to_string_vec;
use crate::utils::{create_spinner, finish_with_success};

/// Date formats tried, in order, when deriving a month from a full string
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y%m%d", "%Y/%m/%d"];

/// Lazily scan a dataset (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means a full table scan for schema inference
    let infer_schema_length = (infer_schema_length > 0).then_some(infer_schema_length);

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(infer_schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => return Err(DiagnosticsError::UnsupportedFormat { extension }.into()),
    };

    Ok(lf)
}

/// Load a dataset into memory behind a spinner.
///
/// # Returns
/// `(DataFrame, rows, columns, estimated memory in MB)`
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let lf = load_dataset(path, infer_schema_length)?;

    let spinner = create_spinner(&format!("Loading {}...", path.display()));
    let df = lf
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    finish_with_success(&spinner, &format!("Loaded {} rows x {} columns", rows, cols));

    tracing::info!(path = %path.display(), rows, cols, memory_mb, "dataset loaded");
    Ok((df, rows, cols, memory_mb))
}

/// Append a `YYYY-MM` string column derived from a date column.
///
/// Accepts date and datetime columns as well as text or integer columns in
/// ISO (`2024-01-31`, optionally followed by a time), `31/01/2024`,
/// `20240131` or `2024/01/31` form. Unparseable cells give a null month.
pub fn derive_monthyear(
    mut df: DataFrame,
    date_column: &str,
    monthyear_column: &str,
) -> Result<DataFrame> {
    let dates = df.column(date_column).map_err(|_| DiagnosticsError::ColumnNotFound {
        column: date_column.to_string(),
        available: df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    })?;

    let cells = column_to_string_vec(dates)
        .with_context(|| format!("Failed to read date column '{}'", date_column))?;
    let months: Vec<Option<String>> = cells
        .iter()
        .map(|cell| cell.as_deref().and_then(parse_monthyear))
        .collect();

    let unparsed = cells
        .iter()
        .zip(&months)
        .filter(|(cell, month)| cell.is_some() && month.is_none())
        .count();
    if unparsed > 0 {
        tracing::warn!(column = date_column, rows = unparsed, "unparseable dates left without a month");
    }

    df.with_column(Column::new(monthyear_column.into(), months))
        .with_context(|| format!("Failed to add column '{}'", monthyear_column))?;
    Ok(df)
}

/// Month bucket (`YYYY-MM`) of a single date string
pub fn parse_monthyear(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let iso = raw
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok());

    iso.or_else(|| {
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    })
    .map(|date| date.format("%Y-%m").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_monthyear_formats() {
        assert_eq!(parse_monthyear("2024-01-31"), Some("2024-01".to_string()));
        assert_eq!(parse_monthyear("2024-03-05 12:30:00"), Some("2024-03".to_string()));
        assert_eq!(parse_monthyear("31/12/2023"), Some("2023-12".to_string()));
        assert_eq!(parse_monthyear("20240215"), Some("2024-02".to_string()));
        assert_eq!(parse_monthyear("2024/07/01"), Some("2024-07".to_string()));
        assert_eq!(parse_monthyear("not a date"), None);
        assert_eq!(parse_monthyear(""), None);
    }

    #[test]
    fn test_derive_monthyear_appends_column() {
        let df = df! {
            "opened" => [Some("2024-01-15"), Some("garbage"), None],
        }
        .unwrap();

        let df = derive_monthyear(df, "opened", "monthyear").unwrap();
        let months = column_to_string_vec(df.column("monthyear").unwrap()).unwrap();
        assert_eq!(months, vec![Some("2024-01".to_string()), None, None]);
    }

    #[test]
    fn test_derive_monthyear_from_integer_dates() {
        let df = df! { "opened" => [20231101i64, 20231215] }.unwrap();
        let df = derive_monthyear(df, "opened", "monthyear").unwrap();
        let months = column_to_string_vec(df.column("monthyear").unwrap()).unwrap();
        assert_eq!(months, vec![Some("2023-11".to_string()), Some("2023-12".to_string())]);
    }

    #[test]
    fn test_derive_monthyear_missing_column() {
        let df = df! { "a" => [1i32] }.unwrap();
        let err = derive_monthyear(df, "opened", "monthyear").unwrap_err();
        assert!(err.to_string().contains("'opened' not found"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_dataset(Path::new("data.xlsx"), 100).err().unwrap();
        assert!(err.to_string().contains("Unsupported file format: 'xlsx'"));
    }
}
