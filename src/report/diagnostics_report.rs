//! Diagnostics report export
//!
//! Writes the JSON report, one CSV per diagnostics table and the page plan,
//! and optionally bundles them into a zip archive.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    DiagnosticsTables, FeatureLists, FeatureOverview, FeatureValueCount, MedianRecord,
    MissingRateRecord, ProportionRecord,
};
use crate::report::ReportDocument;

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub featdiag_version: String,
    pub input_file: String,
    pub target_column: String,
    pub monthyear_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_value: Option<String>,
    pub features: FeatureLists,
}

/// Headline numbers of a run
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub rows: usize,
    /// Rows without a monthyear or target, left out of keyed tables
    pub unkeyed_rows: usize,
    pub months: usize,
    pub categorical_features: usize,
    pub continuous_features: usize,
    pub binned_features: usize,
    pub pages: usize,
}

/// Complete diagnostics report
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub overview: Vec<FeatureOverview>,
    pub tables: DiagnosticsTables,
}

/// Parameters for building a [`DiagnosticsReport`]
pub struct ReportParams {
    pub input_file: String,
    pub target_column: String,
    pub monthyear_column: String,
    pub features: FeatureLists,
    pub rows: usize,
    pub unkeyed_rows: usize,
    pub months: usize,
}

impl DiagnosticsReport {
    pub fn new(
        params: ReportParams,
        overview: Vec<FeatureOverview>,
        tables: DiagnosticsTables,
        document: &ReportDocument,
    ) -> Self {
        let summary = ReportSummary {
            rows: params.rows,
            unkeyed_rows: params.unkeyed_rows,
            months: params.months,
            categorical_features: params.features.categorical.len(),
            continuous_features: params.features.continuous.len(),
            binned_features: overview.iter().filter(|o| o.binned).count(),
            pages: document.page_count(),
        };

        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                featdiag_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: params.input_file,
                target_column: params.target_column,
                monthyear_column: params.monthyear_column,
                event_value: document.event_value.clone(),
                features: params.features,
            },
            summary,
            overview,
            tables,
        }
    }
}

/// Export the diagnostics report to a JSON file
pub fn export_diagnostics_report(report: &DiagnosticsReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize diagnostics report to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!("Failed to write diagnostics report to {}", output_path.display())
    })?;

    Ok(())
}

/// Export the page plan to a JSON file
pub fn export_page_plan(document: &ReportDocument, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document).context("Failed to serialize page plan")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write page plan to {}", output_path.display()))?;

    Ok(())
}

/// A record that can be written as one CSV line
pub trait CsvRow {
    const HEADER: &'static str;

    fn csv_fields(&self) -> Vec<String>;
}

impl CsvRow for FeatureValueCount {
    const HEADER: &'static str = "type,feature name,feature value,target,monthyear,count";

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.feature_type.to_string(),
            self.feature_name.clone(),
            self.feature_value.to_string(),
            self.target.clone().unwrap_or_default(),
            self.monthyear.clone().unwrap_or_default(),
            self.count.to_string(),
        ]
    }
}

impl CsvRow for ProportionRecord {
    const HEADER: &'static str = "type,feature name,feature value,target,count,total,proportion (%)";

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.feature_type.to_string(),
            self.feature_name.clone(),
            self.feature_value.to_string(),
            self.target.clone().unwrap_or_default(),
            self.count.to_string(),
            self.total.to_string(),
            self.proportion_pct
                .map(|p| format!("{:.4}", p))
                .unwrap_or_default(),
        ]
    }
}

impl CsvRow for MissingRateRecord {
    const HEADER: &'static str =
        "type,feature name,feature value,monthyear,total missing value,total by monthyear,missing value (%)";

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.feature_type.to_string(),
            self.feature_name.clone(),
            self.feature_value.to_string(),
            self.monthyear.clone(),
            self.total_missing.to_string(),
            self.total_by_monthyear.to_string(),
            format!("{:.4}", self.missing_pct),
        ]
    }
}

impl CsvRow for MedianRecord {
    const HEADER: &'static str = "feature name,monthyear,median";

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.feature_name.clone(),
            self.monthyear.clone(),
            self.median.to_string(),
        ]
    }
}

/// Export a table of records to CSV
pub fn export_table_csv<R: CsvRow>(rows: &[R], output_path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create CSV file: {}", output_path.display()))?;

    writeln!(file, "{}", R::HEADER)?;
    for row in rows {
        let fields: Vec<String> = row.csv_fields().iter().map(|f| escape_csv_field(f)).collect();
        writeln!(file, "{}", fields.join(","))?;
    }

    Ok(())
}

/// Escape a field for CSV (handle commas and quotes)
pub fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write the report, page plan and every table next to each other.
///
/// Files are named `{stem}_<part>.{json,csv}` inside `output_dir`.
///
/// # Returns
/// The paths written, report first.
pub fn write_diagnostics_outputs(
    report: &DiagnosticsReport,
    document: &ReportDocument,
    output_dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let path = |part: &str, ext: &str| output_dir.join(format!("{}_{}.{}", stem, part, ext));
    let tables = &report.tables;

    let report_path = path("diagnostics", "json");
    export_diagnostics_report(report, &report_path)?;

    let pages_path = path("pages", "json");
    export_page_plan(document, &pages_path)?;

    let mut written = vec![report_path, pages_path];

    let count_tables: [(&str, &[FeatureValueCount]); 4] = [
        ("feature_counts", &tables.feature_counts),
        ("counts_by_value", &tables.counts_by_value),
        ("counts_by_month", &tables.counts_by_month),
        ("target_by_month", &tables.target_by_month),
    ];
    for (part, rows) in count_tables {
        let csv_path = path(part, "csv");
        export_table_csv(rows, &csv_path)?;
        written.push(csv_path);
    }

    let proportions_path = path("proportions", "csv");
    export_table_csv(&tables.proportions, &proportions_path)?;
    written.push(proportions_path);

    let missing_path = path("missing_by_month", "csv");
    export_table_csv(&tables.missing_by_month, &missing_path)?;
    written.push(missing_path);

    let target_missing_path = path("target_missing_by_month", "csv");
    export_table_csv(&tables.target_missing_by_month, &target_missing_path)?;
    written.push(target_missing_path);

    let medians_path = path("medians", "csv");
    export_table_csv(&tables.medians, &medians_path)?;
    written.push(medians_path);

    tracing::debug!(files = written.len(), dir = %output_dir.display(), "diagnostics outputs written");
    Ok(written)
}

/// Package output files into a zip archive and remove the loose copies
pub fn package_diagnostics(files: &[PathBuf], zip_path: &Path) -> Result<()> {
    use std::io::Read;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let zip_file = std::fs::File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for path in files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?;
        zip.start_file(filename, options)
            .with_context(|| format!("Failed to add {} to zip", filename))?;

        let mut content = Vec::new();
        std::fs::File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?
            .read_to_end(&mut content)?;
        zip.write_all(&content)?;
    }

    zip.finish().context("Failed to finalize zip file")?;

    for path in files {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove file: {}", path.display()))?;
    }

    Ok(())
}
