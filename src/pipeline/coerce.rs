//! Numeric coercion for nominally continuous columns
//!
//! Continuous features frequently arrive with stray text ("bad", "n/a", "-")
//! mixed into otherwise numeric columns. Coercion never fails: anything that
//! does not parse as a real number becomes a missing cell.

use anyhow::Result;
use polars::prelude::*;

/// Check whether a raw cell can be parsed as a real number.
///
/// Surrounding whitespace is ignored. `"nan"` and `"inf"` count as numbers
/// here; [`coerce_cell`] still treats them as missing.
pub fn is_number(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok()
}

/// Parse a raw cell into a finite number, or `None`.
pub fn coerce_cell(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Produce a sanitized copy of a column as `Option<f64>` cells.
///
/// The source column is never modified, so the same feature can be coerced
/// by several aggregators in one run. NaN and infinite values map to `None`
/// alongside nulls and unparseable text.
pub fn coerce_numeric(column: &Column) -> Result<Vec<Option<f64>>> {
    let dtype = column.dtype();

    let values: Vec<Option<f64>> = if dtype.is_primitive_numeric() {
        let cast = column.cast(&DataType::Float64)?;
        cast.f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect()
    } else {
        match dtype {
            DataType::Boolean => column
                .bool()?
                .into_iter()
                .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
                .collect(),
            DataType::String => column
                .str()?
                .into_iter()
                .map(|v| v.and_then(coerce_cell))
                .collect(),
            _ => match column.cast(&DataType::String) {
                Ok(cast) => cast
                    .str()?
                    .into_iter()
                    .map(|v| v.and_then(coerce_cell))
                    .collect(),
                Err(e) => {
                    tracing::debug!(
                        column = %column.name(),
                        dtype = %dtype,
                        error = %e,
                        "column cannot be read as text, treating every cell as missing"
                    );
                    vec![None; column.len()]
                }
            },
        }
    };

    Ok(values)
}
