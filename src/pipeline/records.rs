//! Record types produced by the aggregation pipeline
//!
//! Every table the pipeline emits is a `Vec` of one of these records. They are
//! plain derived data: built fresh from the row table on each run and never
//! mutated afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Sentinel label used wherever a missing feature value is displayed
pub const MISSING_SENTINEL: &str = "NA";

/// Feature type discriminator carried by every count record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FeatureType {
    Categorical,
    Continuous,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureType::Categorical => write!(f, "Categorical"),
            FeatureType::Continuous => write!(f, "Continuous"),
        }
    }
}

/// Label of a single feature value after categorisation or binning.
///
/// The derived ordering sorts observed values lexically, interval bins by
/// their position on the number line, and always puts `Missing` last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureValue {
    /// Raw categorical value or stringified discrete continuous value
    Value(String),
    /// Equal-width interval; `index` is the interval's position, 0-based
    Bin { index: usize, label: String },
    /// Missing, null, or non-numeric cell
    Missing,
}

impl FeatureValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }
}

impl From<Option<String>> for FeatureValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FeatureValue::Missing, FeatureValue::Value)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Value(value) => write!(f, "{}", value),
            FeatureValue::Bin { label, .. } => write!(f, "{}", label),
            FeatureValue::Missing => write!(f, "{}", MISSING_SENTINEL),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Count of rows sharing a feature value, optionally broken down by target
/// value and month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureValueCount {
    pub feature_type: FeatureType,
    pub feature_name: String,
    pub feature_value: FeatureValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthyear: Option<String>,
    pub count: u64,
}

/// Median of a continuous feature within one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedianRecord {
    pub feature_name: String,
    pub monthyear: String,
    pub median: f64,
}

/// Share of a feature value's rows that carry a given target value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionRecord {
    pub feature_type: FeatureType,
    pub feature_name: String,
    pub feature_value: FeatureValue,
    pub target: Option<String>,
    pub count: u64,
    /// Rows with this feature value across all target values
    pub total: u64,
    /// `count / total * 100`; `None` when `total` is zero
    pub proportion_pct: Option<f64>,
}

/// Missing-value volume and rate of one feature within one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRateRecord {
    pub feature_type: FeatureType,
    pub feature_name: String,
    pub feature_value: FeatureValue,
    pub monthyear: String,
    pub total_missing: u64,
    pub total_by_monthyear: u64,
    /// `total_missing / total_by_monthyear * 100`; 0 when the month is empty
    pub missing_pct: f64,
}

/// Assigns stable positions to `(type, name)` pairs in first-seen order so
/// that grouped outputs keep the caller's feature iteration order.
#[derive(Debug, Default)]
pub(crate) struct FeatureIndex {
    positions: HashMap<(FeatureType, String), usize>,
    features: Vec<(FeatureType, String)>,
}

impl FeatureIndex {
    pub(crate) fn position(&mut self, feature_type: FeatureType, feature_name: &str) -> usize {
        let key = (feature_type, feature_name.to_string());
        if let Some(&position) = self.positions.get(&key) {
            return position;
        }
        let position = self.features.len();
        self.features.push(key.clone());
        self.positions.insert(key, position);
        position
    }

    pub(crate) fn feature(&self, position: usize) -> (FeatureType, &str) {
        let (feature_type, name) = &self.features[position];
        (*feature_type, name.as_str())
    }
}
