//! Monthly medians of continuous features

use std::collections::BTreeMap;

use anyhow::Result;

use super::records::MedianRecord;
use super::table::RowTable;

/// Median of each continuous feature for every month in the data.
///
/// Values are coerced first, so text and nulls are ignored. A month whose
/// values are all missing gets a median of 0 rather than an undefined value.
/// Rows without a monthyear are skipped.
pub fn median_by_month(table: &RowTable, features: &[String]) -> Result<Vec<MedianRecord>> {
    let months = table.months();
    let mut records = Vec::with_capacity(features.len() * months.len());

    for feature in features {
        let values = table.continuous_cells(feature)?;

        let mut by_month: BTreeMap<&str, Vec<f64>> =
            months.iter().map(|m| (m.as_str(), Vec::new())).collect();

        for (value, month) in values.iter().zip(table.monthyear()) {
            if let (Some(value), Some(month)) = (value, month) {
                if let Some(bucket) = by_month.get_mut(month.as_str()) {
                    bucket.push(*value);
                }
            }
        }

        for (month, mut bucket) in by_month {
            records.push(MedianRecord {
                feature_name: feature.clone(),
                monthyear: month.to_string(),
                median: median(&mut bucket).unwrap_or(0.0),
            });
        }
    }

    Ok(records)
}

/// Median of a slice, averaging the two middle values for even lengths.
///
/// Sorts the slice in place. Returns `None` for an empty slice.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
