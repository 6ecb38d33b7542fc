//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

use featdiag::pipeline::FeatureValueCount;

/// The four-row example used throughout the docs:
/// `age` mixes numbers, text and nulls across two months and two targets.
pub fn create_example_dataframe() -> DataFrame {
    df! {
        "age" => [Some("25"), Some("bad"), Some("40"), None],
        "monthyear" => ["Jan", "Jan", "Feb", "Feb"],
        "target" => ["Y", "N", "Y", "N"],
    }
    .unwrap()
}

/// A small loan-book style DataFrame with known characteristics
///
/// This DataFrame includes:
/// - `bad`: Binary target column (0/1)
/// - `grade`: Categorical feature with one null
/// - `income`: Continuous feature with 11 distinct values and one null (binned)
/// - `term`: Continuous feature with 2 distinct values (discrete)
/// - `monthyear`: Three months
pub fn create_loan_dataframe() -> DataFrame {
    df! {
        "bad" => [0i32, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0],
        "grade" => [Some("A"), Some("C"), Some("B"), Some("A"), None, Some("B"),
                    Some("A"), Some("C"), Some("B"), Some("A"), Some("C"), Some("B")],
        "income" => [Some(1200.0f64), Some(300.0), Some(800.0), Some(1500.0), None, Some(950.0),
                     Some(2100.0), Some(400.0), Some(700.0), Some(1800.0), Some(350.0), Some(1000.0)],
        "term" => [36i64, 60, 36, 36, 60, 36, 36, 60, 36, 36, 60, 60],
        "monthyear" => ["2024-01", "2024-01", "2024-01", "2024-01",
                        "2024-02", "2024-02", "2024-02", "2024-02",
                        "2024-03", "2024-03", "2024-03", "2024-03"],
    }
    .unwrap()
}

/// Create a larger random DataFrame for performance/stress tests
pub fn create_large_test_dataframe(rows: usize, cols: usize) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let mut columns: Vec<Column> = Vec::with_capacity(cols + 2);

    let target: Vec<i32> = (0..rows).map(|_| rng.gen_range(0..2)).collect();
    columns.push(Column::new("target".into(), target));

    let months: Vec<String> = (0..rows)
        .map(|_| format!("2024-{:02}", rng.gen_range(1..=12)))
        .collect();
    columns.push(Column::new("monthyear".into(), months));

    for i in 0..cols {
        let values: Vec<Option<f64>> = (0..rows)
            .map(|_| (rng.gen::<f64>() > 0.1).then(|| rng.gen::<f64>() * 100.0))
            .collect();
        columns.push(Column::new(format!("feature_{}", i).into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Find the count record for a (value, monthyear, target) combination
pub fn find_count<'r>(
    records: &'r [FeatureValueCount],
    feature: &str,
    value: &str,
    month: &str,
    target: &str,
) -> Option<&'r FeatureValueCount> {
    records.iter().find(|r| {
        r.feature_name == feature
            && r.feature_value.to_string() == value
            && r.monthyear.as_deref() == Some(month)
            && r.target.as_deref() == Some(target)
    })
}

/// Assert that counts per (feature, monthyear, target) add up to the rows of
/// that slice
pub fn assert_counts_conserved(records: &[FeatureValueCount], df: &DataFrame, month_col: &str, target_col: &str) {
    use std::collections::HashMap;

    let months = featdiag::pipeline::column_to_string_vec(df.column(month_col).unwrap()).unwrap();
    let targets = featdiag::pipeline::column_to_string_vec(df.column(target_col).unwrap()).unwrap();

    let mut slice_rows: HashMap<(String, String), u64> = HashMap::new();
    for (m, t) in months.into_iter().zip(targets) {
        if let (Some(m), Some(t)) = (m, t) {
            *slice_rows.entry((m, t)).or_insert(0) += 1;
        }
    }

    let mut sums: HashMap<(String, String, String), u64> = HashMap::new();
    for r in records {
        let key = (
            r.feature_name.clone(),
            r.monthyear.clone().unwrap(),
            r.target.clone().unwrap(),
        );
        *sums.entry(key).or_insert(0) += r.count;
    }

    for ((feature, month, target), sum) in sums {
        let expected = slice_rows[&(month.clone(), target.clone())];
        assert_eq!(
            sum, expected,
            "Count mismatch for {} in ({}, {}): expected {}, got {}",
            feature, month, target, expected, sum
        );
    }
}
