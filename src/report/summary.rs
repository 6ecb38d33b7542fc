//! Terminal summary of a diagnostics run

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{FeatureOverview, FeatureType};

/// Missing share above which a feature is highlighted
const HIGH_MISSING_PCT: f64 = 30.0;

/// Run counts and step timings collected while the pipeline runs
#[derive(Debug, Default)]
pub struct DiagnosticsSummary {
    pub rows: usize,
    pub unkeyed_rows: usize,
    pub months: usize,
    pub pages: usize,
    pub overview: Vec<FeatureOverview>,
    pub load_time: Duration,
    pub aggregate_time: Duration,
    pub plan_time: Duration,
    pub save_time: Duration,
}

impl DiagnosticsSummary {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, duration: Duration) {
        self.load_time = duration;
    }

    pub fn set_aggregate_time(&mut self, duration: Duration) {
        self.aggregate_time = duration;
    }

    pub fn set_plan_time(&mut self, duration: Duration) {
        self.plan_time = duration;
    }

    pub fn set_save_time(&mut self, duration: Duration) {
        self.save_time = duration;
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.aggregate_time + self.plan_time + self.save_time
    }

    /// Feature overview rows sorted by missing share, highest first
    pub fn overview_by_missing(&self) -> Vec<&FeatureOverview> {
        let mut rows: Vec<&FeatureOverview> = self.overview.iter().collect();
        rows.sort_by(|a, b| {
            b.missing_pct
                .partial_cmp(&a.missing_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.feature_name.cmp(&b.feature_name))
        });
        rows
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("#").cyan(),
            style("DIAGNOSTICS SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let categorical = self
            .overview
            .iter()
            .filter(|o| o.feature_type == FeatureType::Categorical)
            .count();
        let binned = self.overview.iter().filter(|o| o.binned).count();

        table.add_row(vec![Cell::new("Rows"), Cell::new(self.rows)]);
        table.add_row(vec![
            Cell::new("Rows without month/target"),
            Cell::new(self.unkeyed_rows).fg(if self.unkeyed_rows == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![Cell::new("Months"), Cell::new(self.months)]);
        table.add_row(vec![Cell::new("Categorical features"), Cell::new(categorical)]);
        table.add_row(vec![
            Cell::new("Continuous features"),
            Cell::new(self.overview.len() - categorical),
        ]);
        table.add_row(vec![Cell::new("Binned into intervals"), Cell::new(binned)]);
        table.add_row(vec![
            Cell::new("Chart pages"),
            Cell::new(self.pages)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("Total time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);

        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if self.overview.is_empty() {
            return;
        }

        println!();
        println!(
            "    {} {}",
            style("#").cyan(),
            style("FEATURE OVERVIEW").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.overview_table().to_string().lines() {
            println!("    {}", line);
        }
    }

    fn overview_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Feature").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Missing").add_attribute(Attribute::Bold),
            Cell::new("Distinct").add_attribute(Attribute::Bold),
            Cell::new("Binned").add_attribute(Attribute::Bold),
            Cell::new("Outliers").add_attribute(Attribute::Bold),
        ]);

        for row in self.overview_by_missing() {
            let missing_color = if row.missing_pct > HIGH_MISSING_PCT {
                Color::Red
            } else if row.missing_pct > 0.0 {
                Color::Yellow
            } else {
                Color::White
            };

            table.add_row(vec![
                Cell::new(&row.feature_name),
                Cell::new(row.feature_type),
                Cell::new(format!("{:.1}%", row.missing_pct))
                    .fg(missing_color)
                    .set_alignment(CellAlignment::Right),
                Cell::new(row.distinct_values).set_alignment(CellAlignment::Right),
                Cell::new(if row.binned { "yes" } else { "" }),
                Cell::new(
                    row.outliers
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                )
                .set_alignment(CellAlignment::Right),
            ]);
        }

        table
    }
}
