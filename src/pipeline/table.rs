//! Read-only row table view over a loaded dataset
//!
//! Wraps a polars `DataFrame` together with the names of its monthyear and
//! target columns, and hands out typed per-feature cells for the aggregators.
//! Nothing here mutates the underlying frame.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::coerce::coerce_numeric;
use super::error::DiagnosticsError;
use super::records::MISSING_SENTINEL;

/// Feature columns split by how they are aggregated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureLists {
    pub categorical: Vec<String>,
    pub continuous: Vec<String>,
}

impl FeatureLists {
    pub fn new(categorical: Vec<String>, continuous: Vec<String>) -> Self {
        Self {
            categorical,
            continuous,
        }
    }

    /// Infer feature lists from column dtypes.
    ///
    /// Numeric columns are continuous; string, categorical and boolean columns
    /// are categorical. Columns in `excluded` (target, monthyear, dropped
    /// columns) and columns of any other dtype are skipped.
    pub fn infer(df: &DataFrame, excluded: &[&str]) -> Self {
        let mut lists = Self::default();

        for col in df.get_columns() {
            let name = col.name().as_str();
            if excluded.contains(&name) {
                continue;
            }

            if col.dtype().is_primitive_numeric() {
                lists.continuous.push(name.to_string());
            } else if matches!(
                col.dtype(),
                DataType::String | DataType::Categorical(_, _) | DataType::Boolean
            ) {
                lists.categorical.push(name.to_string());
            } else {
                tracing::debug!(column = name, dtype = %col.dtype(), "skipping column with unsupported dtype");
            }
        }

        lists
    }

    pub fn len(&self) -> usize {
        self.categorical.len() + self.continuous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ensure no column is listed as both categorical and continuous, and that
    /// neither the target nor the monthyear column is listed as a feature.
    pub fn validate(&self, target_column: &str, monthyear_column: &str) -> Result<()> {
        for name in self.categorical.iter().chain(&self.continuous) {
            if name == target_column {
                return Err(DiagnosticsError::ConflictingRole {
                    column: name.clone(),
                    first: "a feature",
                    second: "the target",
                }
                .into());
            }
            if name == monthyear_column {
                return Err(DiagnosticsError::ConflictingRole {
                    column: name.clone(),
                    first: "a feature",
                    second: "the monthyear column",
                }
                .into());
            }
        }

        if let Some(name) = self.categorical.iter().find(|c| self.continuous.contains(c)) {
            return Err(DiagnosticsError::ConflictingRole {
                column: name.clone(),
                first: "categorical",
                second: "continuous",
            }
            .into());
        }

        Ok(())
    }
}

/// Immutable view of the raw dataset used by every aggregator
#[derive(Debug)]
pub struct RowTable<'a> {
    df: &'a DataFrame,
    monthyear_column: String,
    target_column: String,
    monthyear: Vec<Option<String>>,
    target: Vec<Option<String>>,
}

impl<'a> RowTable<'a> {
    /// Build a row table, extracting the monthyear and target key columns.
    pub fn new(df: &'a DataFrame, monthyear_column: &str, target_column: &str) -> Result<Self> {
        let monthyear = column_to_string_vec(require_column(df, monthyear_column)?)
            .with_context(|| format!("Failed to read monthyear column '{}'", monthyear_column))?;
        let target = column_to_string_vec(require_column(df, target_column)?)
            .with_context(|| format!("Failed to read target column '{}'", target_column))?;

        let table = Self {
            df,
            monthyear_column: monthyear_column.to_string(),
            target_column: target_column.to_string(),
            monthyear,
            target,
        };

        let excluded = table.unkeyed_rows();
        if excluded > 0 {
            tracing::warn!(
                rows = excluded,
                "rows with a missing monthyear or target are excluded from month/target aggregates"
            );
        }

        Ok(table)
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn monthyear_column(&self) -> &str {
        &self.monthyear_column
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn monthyear(&self) -> &[Option<String>] {
        &self.monthyear
    }

    pub fn target(&self) -> &[Option<String>] {
        &self.target
    }

    /// Per-row `(monthyear, target)` slice key; `None` when either is missing
    pub fn slice_key(&self, row: usize) -> Option<(&str, &str)> {
        match (&self.monthyear[row], &self.target[row]) {
            (Some(month), Some(target)) => Some((month.as_str(), target.as_str())),
            _ => None,
        }
    }

    /// Every `(monthyear, target)` combination present in the data, sorted
    pub fn slices(&self) -> BTreeSet<(String, String)> {
        (0..self.height())
            .filter_map(|row| self.slice_key(row))
            .map(|(month, target)| (month.to_string(), target.to_string()))
            .collect()
    }

    /// Every non-missing monthyear present in the data, sorted
    pub fn months(&self) -> BTreeSet<String> {
        self.monthyear.iter().flatten().cloned().collect()
    }

    /// Number of rows that belong to no `(monthyear, target)` slice
    pub fn unkeyed_rows(&self) -> usize {
        (0..self.height())
            .filter(|&row| self.slice_key(row).is_none())
            .count()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        require_column(self.df, name)
    }

    /// Feature cells rendered as strings, `None` for nulls.
    ///
    /// A cell holding the missing sentinel text is read as missing, so a slice
    /// never carries two records labelled `NA`.
    pub fn categorical_cells(&self, feature: &str) -> Result<Vec<Option<String>>> {
        let cells = column_to_string_vec(self.column(feature)?)
            .with_context(|| format!("Failed to read categorical feature '{}'", feature))?;
        Ok(cells
            .into_iter()
            .map(|cell| cell.filter(|text| text != MISSING_SENTINEL))
            .collect())
    }

    /// Sanitized numeric copy of a feature; non-numeric cells become `None`
    pub fn continuous_cells(&self, feature: &str) -> Result<Vec<Option<f64>>> {
        coerce_numeric(self.column(feature)?)
            .with_context(|| format!("Failed to coerce continuous feature '{}'", feature))
    }
}

fn require_column<'df>(df: &'df DataFrame, name: &str) -> Result<&'df Column> {
    df.column(name).map_err(|_| {
        DiagnosticsError::ColumnNotFound {
            column: name.to_string(),
            available: df
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
        .into()
    })
}

/// Convert a column to a Vec of Option<String>.
///
/// Floats are rendered with Rust's shortest round-trip formatting, so `25.0`
/// becomes `"25"` and `2.5` stays `"2.5"`. NaN floats count as missing.
pub fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.filter(|n| !n.is_nan()).map(format_number))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Render a number the way feature labels show it
pub fn format_number(value: f64) -> String {
    // -0.0 would otherwise print as "-0"
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df! {
            "monthyear" => [Some("2024-01"), Some("2024-01"), Some("2024-02"), None],
            "target" => [Some("Y"), Some("N"), Some("Y"), Some("N")],
            "age" => [Some(25.0f64), None, Some(40.5), Some(33.0)],
            "city" => [Some("Oslo"), Some("Rome"), None, Some("Oslo")],
            "flag" => [true, false, true, true],
        }
        .unwrap()
    }

    #[test]
    fn test_row_table_keys() {
        let df = sample_df();
        let table = RowTable::new(&df, "monthyear", "target").unwrap();

        assert_eq!(table.height(), 4);
        assert_eq!(table.slice_key(0), Some(("2024-01", "Y")));
        assert_eq!(table.slice_key(3), None);
        assert_eq!(table.unkeyed_rows(), 1);
        assert_eq!(table.slices().len(), 3);
        assert_eq!(
            table.months().into_iter().collect::<Vec<_>>(),
            vec!["2024-01".to_string(), "2024-02".to_string()]
        );
    }

    #[test]
    fn test_missing_key_column_errors() {
        let df = sample_df();
        let err = RowTable::new(&df, "month", "target").unwrap_err();
        assert!(err.to_string().contains("'month' not found"));
    }

    #[test]
    fn test_float_cells_render_without_trailing_zero() {
        let df = sample_df();
        let table = RowTable::new(&df, "monthyear", "target").unwrap();
        let cells = table.categorical_cells("age").unwrap();
        assert_eq!(
            cells,
            vec![Some("25".to_string()), None, Some("40.5".to_string()), Some("33".to_string())]
        );
    }

    #[test]
    fn test_sentinel_text_reads_as_missing() {
        let df = df! {
            "monthyear" => ["Jan", "Jan"],
            "target" => ["Y", "N"],
            "colour" => [Some("NA"), Some("red")],
        }
        .unwrap();
        let table = RowTable::new(&df, "monthyear", "target").unwrap();
        assert_eq!(
            table.categorical_cells("colour").unwrap(),
            vec![None, Some("red".to_string())]
        );
    }

    #[test]
    fn test_infer_feature_lists() {
        let df = sample_df();
        let lists = FeatureLists::infer(&df, &["monthyear", "target"]);
        assert_eq!(lists.continuous, vec!["age".to_string()]);
        assert_eq!(lists.categorical, vec!["city".to_string(), "flag".to_string()]);
    }

    #[test]
    fn test_validate_rejects_target_as_feature() {
        let lists = FeatureLists::new(vec!["target".to_string()], vec![]);
        assert!(lists.validate("target", "monthyear").is_err());

        let lists = FeatureLists::new(vec!["a".to_string()], vec!["a".to_string()]);
        let err = lists.validate("target", "monthyear").unwrap_err();
        assert!(err.to_string().contains("both categorical and continuous"));

        let lists = FeatureLists::new(vec!["a".to_string()], vec!["b".to_string()]);
        assert!(lists.validate("target", "monthyear").is_ok());
    }
}
