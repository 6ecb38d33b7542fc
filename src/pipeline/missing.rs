//! Missing value rates by month

use std::collections::BTreeMap;

use anyhow::Result;

use super::error::DiagnosticsError;
use super::records::{FeatureIndex, FeatureValue, FeatureValueCount, MissingRateRecord};

/// Percentage of missing rows in a month; 0 when the month has no rows
pub fn missing_pct(total_missing: u64, total_by_monthyear: u64) -> f64 {
    if total_by_monthyear == 0 {
        0.0
    } else {
        total_missing as f64 / total_by_monthyear as f64 * 100.0
    }
}

/// Missing-value volume and rate per feature and month.
///
/// `records` should already be rolled up by month (target dropped), but any
/// finer table works since counts are summed per `(type, feature, month)`.
/// Rows whose value equals `missing` make up `total_missing`. A month with
/// no missing rows still gets a record, with the missing value filled in
/// and a count of 0.
///
/// # Errors
/// Returns [`DiagnosticsError::MissingGroupKey`] if a record carries no
/// monthyear.
pub fn count_by_month_missing_values(
    records: &[FeatureValueCount],
    missing: &FeatureValue,
) -> Result<Vec<MissingRateRecord>> {
    let mut index = FeatureIndex::default();
    let mut totals: BTreeMap<(usize, &str), u64> = BTreeMap::new();
    let mut missing_counts: BTreeMap<(usize, &str), u64> = BTreeMap::new();

    for record in records {
        let Some(month) = record.monthyear.as_deref() else {
            return Err(DiagnosticsError::MissingGroupKey {
                feature: record.feature_name.clone(),
                key: "monthyear",
                operation: "computing missing rates by month",
            }
            .into());
        };

        let position = index.position(record.feature_type, &record.feature_name);
        *totals.entry((position, month)).or_insert(0) += record.count;

        if &record.feature_value == missing {
            *missing_counts.entry((position, month)).or_insert(0) += record.count;
        }
    }

    let rates = totals
        .into_iter()
        .map(|((position, month), total_by_monthyear)| {
            let (feature_type, feature_name) = index.feature(position);
            let total_missing = missing_counts.get(&(position, month)).copied().unwrap_or(0);

            MissingRateRecord {
                feature_type,
                feature_name: feature_name.to_string(),
                feature_value: missing.clone(),
                monthyear: month.to_string(),
                total_missing,
                total_by_monthyear,
                missing_pct: missing_pct(total_missing, total_by_monthyear),
            }
        })
        .collect();

    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::records::FeatureType;

    fn record(value: FeatureValue, month: Option<&str>, count: u64) -> FeatureValueCount {
        FeatureValueCount {
            feature_type: FeatureType::Continuous,
            feature_name: "age".to_string(),
            feature_value: value,
            target: None,
            monthyear: month.map(str::to_string),
            count,
        }
    }

    #[test]
    fn test_missing_rate_per_month() {
        let records = vec![
            record(FeatureValue::Value("25".to_string()), Some("Jan"), 1),
            record(FeatureValue::Missing, Some("Jan"), 1),
            record(FeatureValue::Value("40".to_string()), Some("Feb"), 3),
            record(FeatureValue::Missing, Some("Feb"), 1),
        ];

        let rates = count_by_month_missing_values(&records, &FeatureValue::Missing).unwrap();
        assert_eq!(rates.len(), 2);

        let feb = &rates[0];
        assert_eq!(feb.monthyear, "Feb");
        assert_eq!(feb.total_by_monthyear, 4);
        assert_eq!(feb.total_missing, 1);
        assert!((feb.missing_pct - 25.0).abs() < 1e-9);

        let jan = &rates[1];
        assert!((jan.missing_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_month_without_missing_rows_is_backfilled() {
        let records = vec![record(FeatureValue::Value("25".to_string()), Some("Jan"), 4)];

        let rates = count_by_month_missing_values(&records, &FeatureValue::Missing).unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].feature_value, FeatureValue::Missing);
        assert_eq!(rates[0].total_missing, 0);
        assert_eq!(rates[0].missing_pct, 0.0);
    }

    #[test]
    fn test_empty_month_rate_is_zero() {
        let records = vec![record(FeatureValue::Missing, Some("Jan"), 0)];

        let rates = count_by_month_missing_values(&records, &FeatureValue::Missing).unwrap();
        assert_eq!(rates[0].total_by_monthyear, 0);
        assert_eq!(rates[0].missing_pct, 0.0);
    }

    #[test]
    fn test_record_without_month_is_rejected() {
        let records = vec![record(FeatureValue::Missing, None, 1)];

        let err = count_by_month_missing_values(&records, &FeatureValue::Missing).unwrap_err();
        assert!(err.to_string().contains("no monthyear key"));
    }

    #[test]
    fn test_empty_input() {
        let rates = count_by_month_missing_values(&[], &FeatureValue::Missing).unwrap();
        assert!(rates.is_empty());
    }
}
