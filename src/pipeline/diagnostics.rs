//! End-to-end diagnostics run over a row table

use anyhow::{Context, Result};
use serde::Serialize;

use super::aggregate::{aggregate_categorical, aggregate_continuous, count_target_by_month};
use super::median::median_by_month;
use super::missing::count_by_month_missing_values;
use super::proportion::count_by_feature_value_target;
use super::records::{
    FeatureValue, FeatureValueCount, MedianRecord, MissingRateRecord, ProportionRecord,
};
use super::rollup::{count_by_feature_value, GroupKeys};
use super::table::{FeatureLists, RowTable};

/// Every table produced by one diagnostics run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticsTables {
    /// Full counts per (feature value, monthyear, target); categorical
    /// features first, then continuous
    pub feature_counts: Vec<FeatureValueCount>,
    /// Counts per feature value
    pub counts_by_value: Vec<FeatureValueCount>,
    /// Counts per feature value and month
    pub counts_by_month: Vec<FeatureValueCount>,
    pub proportions: Vec<ProportionRecord>,
    pub missing_by_month: Vec<MissingRateRecord>,
    /// Counts of the target's own values per month
    pub target_by_month: Vec<FeatureValueCount>,
    pub target_missing_by_month: Vec<MissingRateRecord>,
    pub medians: Vec<MedianRecord>,
}

/// Run every aggregation over `table` for the given features.
///
/// The row table is scanned once per feature by the aggregators; every other
/// table is derived from their output.
pub fn run_diagnostics(table: &RowTable, features: &FeatureLists) -> Result<DiagnosticsTables> {
    features.validate(table.target_column(), table.monthyear_column())?;

    let mut feature_counts = aggregate_categorical(table, &features.categorical)
        .context("Failed to aggregate categorical features")?;
    feature_counts.extend(
        aggregate_continuous(table, &features.continuous)
            .context("Failed to aggregate continuous features")?,
    );

    let counts_by_value = count_by_feature_value(&feature_counts, GroupKeys::NONE);
    let counts_by_month = count_by_feature_value(&feature_counts, GroupKeys::MONTHYEAR);
    let proportions = count_by_feature_value_target(&feature_counts);
    let missing_by_month = count_by_month_missing_values(&counts_by_month, &FeatureValue::Missing)?;

    let target_by_month = count_target_by_month(table);
    let target_missing_by_month =
        count_by_month_missing_values(&target_by_month, &FeatureValue::Missing)?;

    let medians = median_by_month(table, &features.continuous)
        .context("Failed to compute monthly medians")?;

    tracing::info!(
        categorical = features.categorical.len(),
        continuous = features.continuous.len(),
        count_records = feature_counts.len(),
        months = table.months().len(),
        "diagnostics computed"
    );

    Ok(DiagnosticsTables {
        feature_counts,
        counts_by_value,
        counts_by_month,
        proportions,
        missing_by_month,
        target_by_month,
        target_missing_by_month,
        medians,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_end_to_end_missing_rate() {
        let df = df! {
            "age" => [Some("25"), Some("bad"), Some("40"), None],
            "monthyear" => ["Jan", "Jan", "Feb", "Feb"],
            "target" => ["Y", "N", "Y", "N"],
        }
        .unwrap();
        let table = RowTable::new(&df, "monthyear", "target").unwrap();
        let features = FeatureLists::new(vec![], vec!["age".to_string()]);

        let tables = run_diagnostics(&table, &features).unwrap();

        assert_eq!(tables.missing_by_month.len(), 2);
        for rate in &tables.missing_by_month {
            assert_eq!(rate.total_by_monthyear, 2);
            assert_eq!(rate.total_missing, 1);
            assert!((rate.missing_pct - 50.0).abs() < 1e-9);
        }

        assert_eq!(tables.medians.len(), 2);
        assert!(tables.target_missing_by_month.iter().all(|r| r.total_missing == 0));
    }

    #[test]
    fn test_empty_feature_lists_give_empty_tables() {
        let df = df! {
            "monthyear" => ["Jan"],
            "target" => ["Y"],
        }
        .unwrap();
        let table = RowTable::new(&df, "monthyear", "target").unwrap();

        let tables = run_diagnostics(&table, &FeatureLists::default()).unwrap();
        assert!(tables.feature_counts.is_empty());
        assert!(tables.proportions.is_empty());
        assert!(tables.missing_by_month.is_empty());
        assert!(tables.medians.is_empty());
        assert_eq!(tables.target_by_month.len(), 2);
    }
}
