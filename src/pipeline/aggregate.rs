//! Feature value counts by month and target
//!
//! Both aggregators produce one record per (feature value, monthyear, target)
//! combination observed in the data, plus exactly one missing-value record per
//! (monthyear, target) slice, even when nothing in that slice is missing.

use std::collections::BTreeMap;

use anyhow::Result;

use super::binning::bin_values;
use super::records::{FeatureType, FeatureValue, FeatureValueCount};
use super::table::RowTable;

/// Count categorical feature values by month and target.
///
/// # Arguments
/// * `table` - Row table holding the monthyear and target keys
/// * `features` - Categorical feature columns, in report order
///
/// # Returns
/// Records for every feature concatenated in `features` order. An empty
/// feature list yields an empty vector.
pub fn aggregate_categorical(
    table: &RowTable,
    features: &[String],
) -> Result<Vec<FeatureValueCount>> {
    let mut records = Vec::new();

    for feature in features {
        let cells = table.categorical_cells(feature)?;
        let missing_mask: Vec<bool> = cells.iter().map(Option::is_none).collect();
        let labels: Vec<FeatureValue> = cells.into_iter().map(FeatureValue::from).collect();

        records.extend(count_feature_values(
            table,
            feature,
            FeatureType::Categorical,
            &labels,
            &missing_mask,
        ));
    }

    tracing::debug!(features = features.len(), records = records.len(), "categorical aggregation done");
    Ok(records)
}

/// Count continuous feature values by month and target.
///
/// Each feature is coerced to numbers first (non-numeric cells become
/// missing) and then labelled by the binning policy. The missing count of
/// each slice comes from the coerced cells, before binning.
pub fn aggregate_continuous(
    table: &RowTable,
    features: &[String],
) -> Result<Vec<FeatureValueCount>> {
    let mut records = Vec::new();

    for feature in features {
        let values = table.continuous_cells(feature)?;
        let missing_mask: Vec<bool> = values.iter().map(Option::is_none).collect();
        let labels = bin_values(&values);

        records.extend(count_feature_values(
            table,
            feature,
            FeatureType::Continuous,
            &labels,
            &missing_mask,
        ));
    }

    tracing::debug!(features = features.len(), records = records.len(), "continuous aggregation done");
    Ok(records)
}

/// Count the target column's own values by month.
///
/// Unlike the feature aggregators, rows with a missing target are counted
/// here (as the missing bucket of their month); only rows without a
/// monthyear are skipped. Records carry no target key.
pub fn count_target_by_month(table: &RowTable) -> Vec<FeatureValueCount> {
    let mut counts: BTreeMap<(FeatureValue, String), u64> = BTreeMap::new();

    for month in table.months() {
        counts.insert((FeatureValue::Missing, month), 0);
    }

    for (month, target) in table.monthyear().iter().zip(table.target()) {
        if let Some(month) = month {
            let value = FeatureValue::from(target.clone());
            *counts.entry((value, month.clone())).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|((feature_value, monthyear), count)| FeatureValueCount {
            feature_type: FeatureType::Categorical,
            feature_name: table.target_column().to_string(),
            feature_value,
            target: None,
            monthyear: Some(monthyear),
            count,
        })
        .collect()
}

/// Count labels per (value, monthyear, target) and missing cells per
/// (monthyear, target) slice for a single feature.
fn count_feature_values(
    table: &RowTable,
    feature: &str,
    feature_type: FeatureType,
    labels: &[FeatureValue],
    missing_mask: &[bool],
) -> Vec<FeatureValueCount> {
    let mut value_counts: BTreeMap<(FeatureValue, &str, &str), u64> = BTreeMap::new();
    let mut missing_counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();

    for (row, (label, &missing)) in labels.iter().zip(missing_mask).enumerate() {
        let Some((month, target)) = table.slice_key(row) else {
            continue;
        };

        // every slice gets a missing entry, even if it stays at zero
        let missing_count = missing_counts.entry((month, target)).or_insert(0);
        if missing {
            *missing_count += 1;
        } else {
            *value_counts.entry((label.clone(), month, target)).or_insert(0) += 1;
        }
    }

    let observed = value_counts
        .into_iter()
        .map(|((feature_value, month, target), count)| FeatureValueCount {
            feature_type,
            feature_name: feature.to_string(),
            feature_value,
            target: Some(target.to_string()),
            monthyear: Some(month.to_string()),
            count,
        });

    let missing = missing_counts
        .into_iter()
        .map(|((month, target), count)| FeatureValueCount {
            feature_type,
            feature_name: feature.to_string(),
            feature_value: FeatureValue::Missing,
            target: Some(target.to_string()),
            monthyear: Some(month.to_string()),
            count,
        });

    observed.chain(missing).collect()
}
