//! Per-feature overview statistics for the terminal summary

use anyhow::Result;
use serde::Serialize;

use super::binning::{distinct_count, MAX_DISCRETE_VALUES};
use super::outliers::count_outliers_iqr;
use super::records::FeatureType;
use super::table::{FeatureLists, RowTable};

/// One line of the feature overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureOverview {
    pub feature_type: FeatureType,
    pub feature_name: String,
    pub missing: usize,
    pub missing_pct: f64,
    pub distinct_values: usize,
    /// Continuous feature reported as equal-width intervals
    pub binned: bool,
    /// IQR outliers; `None` for categorical features
    pub outliers: Option<usize>,
}

/// Overview of every feature over all rows, keyed or not.
pub fn overview_features(table: &RowTable, features: &FeatureLists) -> Result<Vec<FeatureOverview>> {
    let rows = table.height();
    let pct = |missing: usize| {
        if rows == 0 {
            0.0
        } else {
            missing as f64 / rows as f64 * 100.0
        }
    };

    let mut overview = Vec::with_capacity(features.len());

    for feature in &features.categorical {
        let cells = table.categorical_cells(feature)?;
        let missing = cells.iter().filter(|c| c.is_none()).count();
        let mut distinct: Vec<&String> = cells.iter().flatten().collect();
        distinct.sort();
        distinct.dedup();

        overview.push(FeatureOverview {
            feature_type: FeatureType::Categorical,
            feature_name: feature.clone(),
            missing,
            missing_pct: pct(missing),
            distinct_values: distinct.len(),
            binned: false,
            outliers: None,
        });
    }

    for feature in &features.continuous {
        let values = table.continuous_cells(feature)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let missing = values.len() - present.len();
        let distinct_values = distinct_count(&values);

        overview.push(FeatureOverview {
            feature_type: FeatureType::Continuous,
            feature_name: feature.clone(),
            missing,
            missing_pct: pct(missing),
            distinct_values,
            binned: distinct_values > MAX_DISCRETE_VALUES,
            outliers: Some(count_outliers_iqr(&present)),
        });
    }

    Ok(overview)
}
