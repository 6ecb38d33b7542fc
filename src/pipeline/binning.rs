//! Binning policy for continuous features
//!
//! A continuous feature with few distinct values is reported value by value.
//! Once it has more than [`MAX_DISCRETE_VALUES`] distinct values it is cut
//! into [`INTERVAL_BIN_COUNT`] equal-width, right-closed intervals.

use std::collections::HashSet;

use super::records::FeatureValue;
use super::table::format_number;

/// Largest distinct-value count still reported as discrete labels
pub const MAX_DISCRETE_VALUES: usize = 10;

/// Number of equal-width intervals used above the discrete threshold
pub const INTERVAL_BIN_COUNT: usize = 10;

/// Fraction of the value range used to nudge the outer edge(s)
const EDGE_ADJUSTMENT: f64 = 0.001;

/// Highest label precision tried before giving up on distinct labels
const MAX_LABEL_PRECISION: i32 = 20;

/// How a continuous feature's values are labelled
#[derive(Debug, Clone, PartialEq)]
pub enum BinningPlan {
    /// Each distinct value is its own label
    Discrete,
    /// Values are labelled by equal-width interval
    EqualWidth(EqualWidthBins),
}

/// Equal-width, right-closed interval edges with display labels
#[derive(Debug, Clone, PartialEq)]
pub struct EqualWidthBins {
    edges: Vec<f64>,
    labels: Vec<String>,
}

impl EqualWidthBins {
    /// Cut `[min, max]` into `bin_count` equal-width intervals `(a, b]`.
    ///
    /// The first edge is moved left by 0.1% of the range so that `min` falls
    /// inside the first interval. A degenerate range (`min == max`) is
    /// widened by 0.1% of `|min|` on both sides (0.001 when `min` is zero).
    pub fn new(min: f64, max: f64, bin_count: usize) -> Self {
        let bin_count = bin_count.max(1);

        let edges = if min == max {
            let (lo, hi) = if min == 0.0 {
                (min - EDGE_ADJUSTMENT, max + EDGE_ADJUSTMENT)
            } else {
                (min - EDGE_ADJUSTMENT * min.abs(), max + EDGE_ADJUSTMENT * max.abs())
            };
            linspace(lo, hi, bin_count + 1)
        } else {
            let mut edges = linspace(min, max, bin_count + 1);
            edges[0] -= (max - min) * EDGE_ADJUSTMENT;
            edges
        };

        let labels = interval_labels(&edges);
        Self { edges, labels }
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Interval index for a value; values outside the edges clamp to the
    /// nearest interval.
    pub fn index_of(&self, value: f64) -> usize {
        let last = self.bin_count() - 1;
        self.edges[1..]
            .iter()
            .position(|&upper| value <= upper)
            .unwrap_or(last)
    }

    pub fn label_for(&self, value: f64) -> FeatureValue {
        let index = self.index_of(value);
        FeatureValue::Bin {
            index,
            label: self.labels[index].clone(),
        }
    }
}

/// Count distinct non-missing values (`-0.0` and `0.0` count once)
pub fn distinct_count(values: &[Option<f64>]) -> usize {
    values
        .iter()
        .flatten()
        .map(|v| if *v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() })
        .collect::<HashSet<u64>>()
        .len()
}

/// Decide between discrete labels and equal-width intervals
pub fn plan_binning(values: &[Option<f64>]) -> BinningPlan {
    let distinct = distinct_count(values);
    if distinct <= MAX_DISCRETE_VALUES {
        return BinningPlan::Discrete;
    }

    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    BinningPlan::EqualWidth(EqualWidthBins::new(min, max, INTERVAL_BIN_COUNT))
}

/// Label every sanitized value; the output is aligned row-for-row with the
/// input and missing cells become [`FeatureValue::Missing`].
pub fn bin_values(values: &[Option<f64>]) -> Vec<FeatureValue> {
    let plan = plan_binning(values);

    values
        .iter()
        .map(|value| match (value, &plan) {
            (None, _) => FeatureValue::Missing,
            (Some(v), BinningPlan::Discrete) => FeatureValue::Value(format_number(*v)),
            (Some(v), BinningPlan::EqualWidth(bins)) => bins.label_for(*v),
        })
        .collect()
}

fn linspace(start: f64, stop: f64, points: usize) -> Vec<f64> {
    let step = (stop - start) / (points - 1) as f64;
    let mut values: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
    // keep the right edge exact so the maximum lands in the last interval
    values[points - 1] = stop;
    values
}

/// Build `(a, b]` labels, rounding edges to the smallest precision (from 0
/// decimals up) at which all edges stay distinct.
fn interval_labels(edges: &[f64]) -> Vec<String> {
    let precision = (0..MAX_LABEL_PRECISION)
        .find(|&p| {
            let rounded: HashSet<u64> = edges.iter().map(|&e| round_frac(e, p).to_bits()).collect();
            rounded.len() == edges.len()
        })
        .unwrap_or(MAX_LABEL_PRECISION);

    edges
        .windows(2)
        .map(|pair| {
            format!(
                "({}, {}]",
                format_number(round_frac(pair[0], precision)),
                format_number(round_frac(pair[1], precision))
            )
        })
        .collect()
}

/// Round to `precision` decimals, or to `precision` significant decimals
/// for values between -1 and 1.
fn round_frac(value: f64, precision: i32) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }

    let digits = if value.trunc() == 0.0 {
        -(value.fract().abs().log10().floor() as i32) - 1 + precision
    } else {
        precision
    };

    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
