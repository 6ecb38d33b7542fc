//! Command-line argument definitions using clap

use clap::Parser;
use std::path::{Path, PathBuf};

/// featdiag - Month-by-month feature diagnostics against a target column
#[derive(Parser, Debug)]
#[command(name = "featdiag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target column name; proportions are stratified by its values
    #[arg(short, long)]
    pub target: String,

    /// Column holding the month bucket of each row
    #[arg(long, default_value = "monthyear")]
    pub monthyear_column: String,

    /// Date column to derive the month bucket from (YYYY-MM).
    /// When given, the derived column is written to --monthyear-column.
    #[arg(long)]
    pub date_column: Option<String>,

    /// Categorical feature columns (comma-separated).
    /// When neither this nor --continuous is given, features are inferred from column types.
    #[arg(long, value_delimiter = ',')]
    pub categorical: Vec<String>,

    /// Continuous feature columns (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub continuous: Vec<String>,

    /// Columns to ignore when inferring features (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub drop_columns: Vec<String>,

    /// Target value whose proportion is charted on count-by-value pages.
    /// Defaults to the greatest target value (e.g. 1 for 0/1, Y for N/Y).
    #[arg(long)]
    pub event_value: Option<String>,

    /// Output directory. Defaults to the input file's directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rotate x-axis labels on every chart page
    #[arg(long, default_value = "false")]
    pub rotate_x_labels: bool,

    /// Keep the output files loose instead of bundling them into a zip
    #[arg(long, default_value = "false")]
    pub no_zip: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Output directory, falling back to the input's directory
    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            self.input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf()
        })
    }

    /// File stem shared by every output file
    pub fn output_stem(&self) -> String {
        self.input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset")
            .to_string()
    }

    /// Zip archive path, `{stem}_diagnostics.zip` in the output directory
    pub fn zip_path(&self) -> PathBuf {
        self.output_dir()
            .join(format!("{}_diagnostics.zip", self.output_stem()))
    }

    /// Whether feature lists were given explicitly
    pub fn has_explicit_features(&self) -> bool {
        !self.categorical.is_empty() || !self.continuous.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_defaults_to_input_parent() {
        let cli = Cli::parse_from(["featdiag", "-i", "/data/loans.csv", "-t", "bad"]);
        assert_eq!(cli.output_dir(), PathBuf::from("/data"));
        assert_eq!(cli.zip_path(), PathBuf::from("/data/loans_diagnostics.zip"));
    }

    #[test]
    fn test_bare_file_name_uses_current_dir() {
        let cli = Cli::parse_from(["featdiag", "-i", "loans.csv", "-t", "bad"]);
        assert_eq!(cli.output_dir(), PathBuf::from("."));
        assert_eq!(cli.output_stem(), "loans");
    }
}
