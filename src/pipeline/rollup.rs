//! Re-aggregation of feature value counts along optional keys
//!
//! The full (value × month × target) counts are computed once from the row
//! table; every coarser view the reports need is a rollup of those counts.

use std::collections::BTreeMap;

use super::records::{FeatureIndex, FeatureValue, FeatureValueCount};

/// Extra grouping keys kept on top of `(type, feature name, feature value)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GroupKeys {
    pub target: bool,
    pub monthyear: bool,
}

impl GroupKeys {
    /// Totals per feature value
    pub const NONE: GroupKeys = GroupKeys {
        target: false,
        monthyear: false,
    };
    /// Per feature value and target value
    pub const TARGET: GroupKeys = GroupKeys {
        target: true,
        monthyear: false,
    };
    /// Per feature value and month
    pub const MONTHYEAR: GroupKeys = GroupKeys {
        target: false,
        monthyear: true,
    };
    /// Per feature value, target value and month
    pub const TARGET_AND_MONTHYEAR: GroupKeys = GroupKeys {
        target: true,
        monthyear: true,
    };
}

/// Sum `count` by `(type, feature name, feature value)` plus the keys enabled
/// in `keys`.
///
/// Keys that are not kept are cleared to `None` in the output. Features keep
/// their first-seen order; within a feature, rows are ordered by value (with
/// the missing bucket last), then target, then month.
pub fn count_by_feature_value(
    records: &[FeatureValueCount],
    keys: GroupKeys,
) -> Vec<FeatureValueCount> {
    let mut index = FeatureIndex::default();
    let mut sums: BTreeMap<(usize, FeatureValue, Option<String>, Option<String>), u64> =
        BTreeMap::new();

    for record in records {
        let position = index.position(record.feature_type, &record.feature_name);
        let target = record.target.clone().filter(|_| keys.target);
        let monthyear = record.monthyear.clone().filter(|_| keys.monthyear);

        *sums
            .entry((position, record.feature_value.clone(), target, monthyear))
            .or_insert(0) += record.count;
    }

    sums.into_iter()
        .map(|((position, feature_value, target, monthyear), count)| {
            let (feature_type, feature_name) = index.feature(position);
            FeatureValueCount {
                feature_type,
                feature_name: feature_name.to_string(),
                feature_value,
                target,
                monthyear,
                count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::records::FeatureType;

    fn record(value: &str, target: &str, month: &str, count: u64) -> FeatureValueCount {
        FeatureValueCount {
            feature_type: FeatureType::Categorical,
            feature_name: "colour".to_string(),
            feature_value: if value == "NA" {
                FeatureValue::Missing
            } else {
                FeatureValue::Value(value.to_string())
            },
            target: Some(target.to_string()),
            monthyear: Some(month.to_string()),
            count,
        }
    }

    fn sample() -> Vec<FeatureValueCount> {
        vec![
            record("red", "Y", "Jan", 3),
            record("red", "N", "Jan", 1),
            record("red", "Y", "Feb", 2),
            record("blue", "N", "Feb", 4),
            record("NA", "Y", "Jan", 0),
            record("NA", "N", "Feb", 5),
        ]
    }

    #[test]
    fn test_rollup_without_keys() {
        let rolled = count_by_feature_value(&sample(), GroupKeys::NONE);
        assert_eq!(rolled.len(), 3);
        assert_eq!(rolled[0].feature_value.to_string(), "blue");
        assert_eq!(rolled[0].count, 4);
        assert_eq!(rolled[1].count, 6);
        assert_eq!(rolled[2].feature_value, FeatureValue::Missing);
        assert_eq!(rolled[2].count, 5);
        assert!(rolled.iter().all(|r| r.target.is_none() && r.monthyear.is_none()));
    }

    #[test]
    fn test_rollup_by_target() {
        let rolled = count_by_feature_value(&sample(), GroupKeys::TARGET);
        let red_y = rolled
            .iter()
            .find(|r| r.feature_value.to_string() == "red" && r.target.as_deref() == Some("Y"))
            .unwrap();
        assert_eq!(red_y.count, 5);
        assert!(rolled.iter().all(|r| r.monthyear.is_none()));
    }

    #[test]
    fn test_rollup_by_month() {
        let rolled = count_by_feature_value(&sample(), GroupKeys::MONTHYEAR);
        let red_jan = rolled
            .iter()
            .find(|r| r.feature_value.to_string() == "red" && r.monthyear.as_deref() == Some("Jan"))
            .unwrap();
        assert_eq!(red_jan.count, 4);
        assert!(rolled.iter().all(|r| r.target.is_none()));
    }

    #[test]
    fn test_rollup_by_both_is_identity_on_distinct_rows() {
        let input = sample();
        let rolled = count_by_feature_value(&input, GroupKeys::TARGET_AND_MONTHYEAR);
        assert_eq!(rolled.len(), input.len());
        let total: u64 = rolled.iter().map(|r| r.count).sum();
        assert_eq!(total, input.iter().map(|r| r.count).sum::<u64>());
    }

    #[test]
    fn test_rollup_keeps_feature_order() {
        let mut input = vec![FeatureValueCount {
            feature_type: FeatureType::Continuous,
            feature_name: "zeta".to_string(),
            feature_value: FeatureValue::Value("1".to_string()),
            target: None,
            monthyear: None,
            count: 1,
        }];
        input.extend(sample());

        let rolled = count_by_feature_value(&input, GroupKeys::NONE);
        assert_eq!(rolled[0].feature_name, "zeta");
        assert_eq!(rolled[1].feature_name, "colour");
    }
}
