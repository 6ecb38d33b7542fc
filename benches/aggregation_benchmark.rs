//! Benchmark of the aggregation pipeline on synthetic monthly data
//!
//! Run with: cargo bench --bench aggregation_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use featdiag::pipeline::{
    aggregate_categorical, aggregate_continuous, bin_values, count_by_feature_value,
    count_by_feature_value_target, run_diagnostics, FeatureLists, GroupKeys, RowTable,
};

const CATEGORIES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Generate a frame with a month column, a 0/1 target and mixed features
fn generate_test_dataframe(n_rows: usize, n_features: usize, seed: u64) -> (DataFrame, FeatureLists) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let target: Vec<i32> = (0..n_rows)
        .map(|_| if rng.gen::<f64>() > 0.8 { 1 } else { 0 })
        .collect();
    let months: Vec<String> = (0..n_rows)
        .map(|_| format!("2023-{:02}", rng.gen_range(1..=12)))
        .collect();

    let mut columns = vec![
        Column::new("target".into(), target),
        Column::new("monthyear".into(), months),
    ];
    let mut features = FeatureLists::default();

    for i in 0..n_features {
        if i % 2 == 0 {
            // continuous with ~5% missing
            let values: Vec<Option<f64>> = (0..n_rows)
                .map(|_| (rng.gen::<f64>() > 0.05).then(|| rng.gen::<f64>() * 1000.0))
                .collect();
            let name = format!("amount_{}", i);
            columns.push(Column::new(name.as_str().into(), values));
            features.continuous.push(name);
        } else {
            let values: Vec<Option<&str>> = (0..n_rows)
                .map(|_| {
                    (rng.gen::<f64>() > 0.05).then(|| CATEGORIES[rng.gen_range(0..CATEGORIES.len())])
                })
                .collect();
            let name = format!("segment_{}", i);
            columns.push(Column::new(name.as_str().into(), values));
            features.categorical.push(name);
        }
    }

    let df = DataFrame::new(columns).expect("Failed to create DataFrame");
    (df, features)
}

/// Benchmark the aggregators separately for growing row counts
fn benchmark_aggregators(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregators");

    for n_rows in [10_000, 50_000, 100_000] {
        let (df, features) = generate_test_dataframe(n_rows, 2, 42);
        let table = RowTable::new(&df, "monthyear", "target").expect("valid fixture");
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::new("categorical", n_rows), &table, |b, table| {
            b.iter(|| aggregate_categorical(black_box(table), black_box(&features.categorical)));
        });

        group.bench_with_input(BenchmarkId::new("continuous", n_rows), &table, |b, table| {
            b.iter(|| aggregate_continuous(black_box(table), black_box(&features.continuous)));
        });
    }

    group.finish();
}

/// Benchmark binning alone on pre-coerced values
fn benchmark_binning(c: &mut Criterion) {
    let mut group = c.benchmark_group("binning");
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);

    for n_rows in [10_000, 100_000] {
        let values: Vec<Option<f64>> = (0..n_rows).map(|_| Some(rng.gen::<f64>() * 500.0)).collect();
        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::new("equal_width", n_rows), &values, |b, values| {
            b.iter(|| bin_values(black_box(values)));
        });
    }

    group.finish();
}

/// Benchmark rollups and proportions, which never touch the row table
fn benchmark_derived_tables(c: &mut Criterion) {
    let (df, features) = generate_test_dataframe(50_000, 10, 42);
    let table = RowTable::new(&df, "monthyear", "target").expect("valid fixture");
    let tables = run_diagnostics(&table, &features).expect("diagnostics run");
    let counts = &tables.feature_counts;

    let mut group = c.benchmark_group("derived_tables");
    group.bench_function("rollup_monthyear", |b| {
        b.iter(|| count_by_feature_value(black_box(counts), GroupKeys::MONTHYEAR));
    });
    group.bench_function("proportions", |b| {
        b.iter(|| count_by_feature_value_target(black_box(counts)));
    });
    group.finish();
}

/// Full run for several feature counts
fn benchmark_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(10);

    for n_features in [10, 50] {
        let (df, features) = generate_test_dataframe(20_000, n_features, 42);
        let table = RowTable::new(&df, "monthyear", "target").expect("valid fixture");
        group.throughput(Throughput::Elements(n_features as u64));

        group.bench_with_input(BenchmarkId::new("features", n_features), &features, |b, features| {
            b.iter(|| run_diagnostics(black_box(&table), black_box(features)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_aggregators,
    benchmark_binning,
    benchmark_derived_tables,
    benchmark_full_run
);
criterion_main!(benches);
