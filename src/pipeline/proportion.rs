//! Target-stratified proportions per feature value

use std::collections::BTreeMap;

use super::records::{FeatureIndex, FeatureValue, FeatureValueCount, ProportionRecord};

/// Percentage share of `count` in `total`; undefined when `total` is zero
pub fn proportion_pct(count: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(count as f64 / total as f64 * 100.0)
    }
}

/// Count each feature value by target value and attach its share of the
/// feature value's rows.
///
/// The total for a feature value sums every target value, and the missing
/// bucket is treated like any other value. A feature value whose total is
/// zero (for example a missing bucket with nothing missing) gets an
/// undefined proportion instead of 0%.
pub fn count_by_feature_value_target(records: &[FeatureValueCount]) -> Vec<ProportionRecord> {
    let mut index = FeatureIndex::default();
    let mut counts: BTreeMap<(usize, FeatureValue, Option<String>), u64> = BTreeMap::new();
    let mut totals: BTreeMap<(usize, FeatureValue), u64> = BTreeMap::new();

    for record in records {
        let position = index.position(record.feature_type, &record.feature_name);

        *counts
            .entry((position, record.feature_value.clone(), record.target.clone()))
            .or_insert(0) += record.count;
        *totals
            .entry((position, record.feature_value.clone()))
            .or_insert(0) += record.count;
    }

    counts
        .into_iter()
        .map(|((position, feature_value, target), count)| {
            let (feature_type, feature_name) = index.feature(position);
            let total = totals
                .get(&(position, feature_value.clone()))
                .copied()
                .unwrap_or(0);

            ProportionRecord {
                feature_type,
                feature_name: feature_name.to_string(),
                feature_value,
                target,
                count,
                total,
                proportion_pct: proportion_pct(count, total),
            }
        })
        .collect()
}
