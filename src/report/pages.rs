//! Chart page planning
//!
//! Turns the diagnostics tables into an ordered list of chart pages, one per
//! feature per chart kind. Drawing is left to whatever consumes the plan;
//! page order is part of the output contract.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::pipeline::{
    DiagnosticsTables, FeatureLists, FeatureType, FeatureValue, MissingRateRecord,
};

/// Pages listing more distinct values than this are cut to the top values
pub const MAX_DISTINCT_VALUES: usize = 10;

/// Kind of chart drawn on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    TargetMissingByMonth,
    MissingByMonth,
    CountByValue,
    CountByMonth,
    MedianByMonth,
}

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesStyle {
    Bar,
    Line,
}

/// Which y axis a series is plotted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: String,
    /// `None` renders as a gap
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub style: SeriesStyle,
    pub axis: Axis,
    pub points: Vec<SeriesPoint>,
}

/// A single chart page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPage {
    pub kind: PageKind,
    pub feature_name: String,
    pub feature_type: FeatureType,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_y_label: Option<String>,
    /// Fixed `[min, max]` of the secondary axis; free when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_y_range: Option<[f64; 2]>,
    pub rotate_x_labels: bool,
    pub series: Vec<Series>,
}

/// Ordered page plan handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub target_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_value: Option<String>,
    pub pages: Vec<ChartPage>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages_of_kind(&self, kind: PageKind) -> impl Iterator<Item = &ChartPage> {
        self.pages.iter().filter(move |p| p.kind == kind)
    }
}

/// Options that change how pages are planned
#[derive(Debug, Clone, Default)]
pub struct PagePlanOptions {
    /// Target value whose proportion is drawn on count-by-value pages.
    /// Defaults to the greatest target value in the data.
    pub event_value: Option<String>,
    pub rotate_x_labels: bool,
}

/// Plan every page for a diagnostics run.
///
/// Order: the target's missing-by-month page, then per feature (categorical
/// first, then continuous) missing-by-month pages, count-by-value pages and
/// count-by-month pages, then median pages for continuous features.
pub fn plan_pages(
    tables: &DiagnosticsTables,
    features: &FeatureLists,
    target_column: &str,
    options: &PagePlanOptions,
) -> ReportDocument {
    let event_value = options
        .event_value
        .clone()
        .or_else(|| default_event_value(tables));

    let ordered: Vec<(FeatureType, &str)> = features
        .categorical
        .iter()
        .map(|f| (FeatureType::Categorical, f.as_str()))
        .chain(
            features
                .continuous
                .iter()
                .map(|f| (FeatureType::Continuous, f.as_str())),
        )
        .collect();

    let rotate = options.rotate_x_labels;
    let mut pages = Vec::new();

    pages.push(missing_page(
        PageKind::TargetMissingByMonth,
        target_column,
        FeatureType::Categorical,
        &tables.target_missing_by_month,
        rotate,
    ));

    for &(feature_type, feature) in &ordered {
        let rates: Vec<MissingRateRecord> = tables
            .missing_by_month
            .iter()
            .filter(|r| r.feature_type == feature_type && r.feature_name == feature)
            .cloned()
            .collect();
        pages.push(missing_page(PageKind::MissingByMonth, feature, feature_type, &rates, rotate));
    }

    for &(feature_type, feature) in &ordered {
        pages.push(count_by_value_page(
            tables,
            feature,
            feature_type,
            target_column,
            event_value.as_deref(),
            rotate,
        ));
    }

    for &(feature_type, feature) in &ordered {
        pages.push(count_by_month_page(tables, feature, feature_type, rotate));
    }

    for feature in &features.continuous {
        pages.push(median_page(tables, feature, rotate));
    }

    tracing::debug!(pages = pages.len(), "page plan built");

    ReportDocument {
        target_column: target_column.to_string(),
        event_value,
        pages,
    }
}

/// Greatest non-missing target value, which is the event for 0/1 and N/Y
/// targets. Values compare as numbers when every one of them parses as a
/// number, so `10` outranks `9`.
fn default_event_value(tables: &DiagnosticsTables) -> Option<String> {
    let values: Vec<&String> = tables
        .target_by_month
        .iter()
        .filter_map(|r| match &r.feature_value {
            FeatureValue::Value(v) => Some(v),
            _ => None,
        })
        .collect();

    let numeric: Option<Vec<f64>> = values.iter().map(|v| v.trim().parse::<f64>().ok()).collect();
    match numeric {
        Some(numbers) => values
            .iter()
            .zip(numbers)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(v, _)| (*v).clone()),
        None => values.into_iter().max().cloned(),
    }
}

fn missing_page(
    kind: PageKind,
    feature: &str,
    feature_type: FeatureType,
    rates: &[MissingRateRecord],
    rotate_x_labels: bool,
) -> ChartPage {
    let totals = rates
        .iter()
        .map(|r| SeriesPoint {
            x: r.monthyear.clone(),
            y: Some(r.total_missing as f64),
        })
        .collect();
    let pcts = rates
        .iter()
        .map(|r| SeriesPoint {
            x: r.monthyear.clone(),
            y: Some(r.missing_pct),
        })
        .collect();

    ChartPage {
        kind,
        feature_name: feature.to_string(),
        feature_type,
        title: format!("{}: Total missing values by month", feature),
        x_label: "monthyear".to_string(),
        y_label: "total missing value".to_string(),
        secondary_y_label: Some("missing value (%)".to_string()),
        secondary_y_range: Some([0.0, 100.0]),
        rotate_x_labels,
        series: vec![
            Series {
                name: "total missing value".to_string(),
                style: SeriesStyle::Bar,
                axis: Axis::Primary,
                points: totals,
            },
            Series {
                name: "missing value (%)".to_string(),
                style: SeriesStyle::Line,
                axis: Axis::Secondary,
                points: pcts,
            },
        ],
    }
}

fn count_by_value_page(
    tables: &DiagnosticsTables,
    feature: &str,
    feature_type: FeatureType,
    target_column: &str,
    event_value: Option<&str>,
    rotate_x_labels: bool,
) -> ChartPage {
    let proportion_title = format!(
        "{}={} proportion (%)",
        target_column,
        event_value.unwrap_or_default()
    );

    let proportions: BTreeMap<&FeatureValue, f64> = tables
        .proportions
        .iter()
        .filter(|p| {
            p.feature_type == feature_type
                && p.feature_name == feature
                && p.target.as_deref() == event_value
        })
        .map(|p| (&p.feature_value, p.proportion_pct.unwrap_or(0.0)))
        .collect();

    // counts_by_value is already in value order with the missing bucket last
    let mut rows: Vec<(&FeatureValue, u64, f64)> = tables
        .counts_by_value
        .iter()
        .filter(|r| r.feature_type == feature_type && r.feature_name == feature)
        .map(|r| {
            let proportion = proportions.get(&r.feature_value).copied().unwrap_or(0.0);
            (&r.feature_value, r.count, proportion)
        })
        .collect();

    let truncated = rows.len() >= MAX_DISTINCT_VALUES;
    if truncated {
        rows.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
        rows.truncate(MAX_DISTINCT_VALUES);
    }

    let title = if truncated {
        format!(
            "{}: Barchart of count by feature value with Top {} highest {}",
            feature, MAX_DISTINCT_VALUES, proportion_title
        )
    } else {
        format!("{}: Barchart of count by feature value with {}", feature, proportion_title)
    };

    let x_label = match feature_type {
        FeatureType::Categorical => "feature value",
        FeatureType::Continuous => "range value",
    };

    ChartPage {
        kind: PageKind::CountByValue,
        feature_name: feature.to_string(),
        feature_type,
        title,
        x_label: x_label.to_string(),
        y_label: "count".to_string(),
        secondary_y_label: Some(proportion_title.clone()),
        secondary_y_range: None,
        rotate_x_labels,
        series: vec![
            Series {
                name: "count".to_string(),
                style: SeriesStyle::Bar,
                axis: Axis::Primary,
                points: rows
                    .iter()
                    .map(|(value, count, _)| SeriesPoint {
                        x: value.to_string(),
                        y: Some(*count as f64),
                    })
                    .collect(),
            },
            Series {
                name: proportion_title,
                style: SeriesStyle::Line,
                axis: Axis::Secondary,
                points: rows
                    .iter()
                    .map(|(value, _, proportion)| SeriesPoint {
                        x: value.to_string(),
                        y: Some(*proportion),
                    })
                    .collect(),
            },
        ],
    }
}

fn count_by_month_page(
    tables: &DiagnosticsTables,
    feature: &str,
    feature_type: FeatureType,
    rotate_x_labels: bool,
) -> ChartPage {
    let mut by_value: BTreeMap<&FeatureValue, Vec<SeriesPoint>> = BTreeMap::new();
    for record in tables
        .counts_by_month
        .iter()
        .filter(|r| r.feature_type == feature_type && r.feature_name == feature)
    {
        by_value.entry(&record.feature_value).or_default().push(SeriesPoint {
            x: record.monthyear.clone().unwrap_or_default(),
            y: Some(record.count as f64),
        });
    }

    let mut values: Vec<(&FeatureValue, Vec<SeriesPoint>)> = by_value.into_iter().collect();
    let truncated = values.len() >= MAX_DISTINCT_VALUES;
    if truncated {
        // values present in the most months first; ties keep value order
        values.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        values.truncate(MAX_DISTINCT_VALUES);
    }

    let title = if truncated {
        format!(
            "{}: Top {} highest count of features by month and year",
            feature, MAX_DISTINCT_VALUES
        )
    } else {
        format!("{}: Count features by month and year", feature)
    };

    ChartPage {
        kind: PageKind::CountByMonth,
        feature_name: feature.to_string(),
        feature_type,
        title,
        x_label: "monthyear".to_string(),
        y_label: "count".to_string(),
        secondary_y_label: None,
        secondary_y_range: None,
        rotate_x_labels,
        series: values
            .into_iter()
            .map(|(value, points)| Series {
                name: value.to_string(),
                style: SeriesStyle::Line,
                axis: Axis::Primary,
                points,
            })
            .collect(),
    }
}

fn median_page(tables: &DiagnosticsTables, feature: &str, rotate_x_labels: bool) -> ChartPage {
    let points = tables
        .medians
        .iter()
        .filter(|m| m.feature_name == feature)
        .map(|m| SeriesPoint {
            x: m.monthyear.clone(),
            y: Some(m.median),
        })
        .collect();

    ChartPage {
        kind: PageKind::MedianByMonth,
        feature_name: feature.to_string(),
        feature_type: FeatureType::Continuous,
        title: format!("{}: Median value by month and year", feature),
        x_label: "monthyear".to_string(),
        y_label: "median".to_string(),
        secondary_y_label: None,
        secondary_y_range: None,
        rotate_x_labels,
        series: vec![Series {
            name: "median".to_string(),
            style: SeriesStyle::Line,
            axis: Axis::Primary,
            points,
        }],
    }
}
