//! featdiag: Feature Diagnostics CLI Tool
//!
//! Loads a dataset, aggregates every feature by month and target, and writes
//! the diagnostics tables plus a chart page plan.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use featdiag::cli::Cli;
use featdiag::pipeline::{
    derive_monthyear, load_dataset_with_progress, overview_features, run_diagnostics,
    FeatureLists, RowTable,
};
use featdiag::report::{
    package_diagnostics, plan_pages, write_diagnostics_outputs, DiagnosticsReport,
    DiagnosticsSummary, PagePlanOptions, ReportParams,
};
use featdiag::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_features, print_info, print_step_header, print_step_time, print_success,
    print_warning, RunConfig,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_dir = cli.output_dir();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&RunConfig {
        input: &cli.input,
        target: &cli.target,
        monthyear_column: &cli.monthyear_column,
        date_column: cli.date_column.as_deref(),
        output_dir: &output_dir,
        event_value: cli.event_value.as_deref(),
    });

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let (mut df, rows, cols, memory_mb) =
        load_dataset_with_progress(&cli.input, cli.infer_schema_length)?;

    if let Some(date_column) = &cli.date_column {
        df = derive_monthyear(df, date_column, &cli.monthyear_column)?;
        print_success(&format!(
            "Derived '{}' from '{}'",
            cli.monthyear_column, date_column
        ));
    }

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let mut summary = DiagnosticsSummary::new(rows);
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: Resolve feature lists
    print_step_header(2, "Resolve Features");
    let features = if cli.has_explicit_features() {
        print_info("Using the feature lists given on the command line");
        FeatureLists::new(cli.categorical.clone(), cli.continuous.clone())
    } else {
        let mut excluded: Vec<&str> = vec![cli.target.as_str(), cli.monthyear_column.as_str()];
        excluded.extend(cli.date_column.as_deref());
        excluded.extend(cli.drop_columns.iter().map(String::as_str));
        print_info("Inferring features from column types");
        FeatureLists::infer(&df, &excluded)
    };
    features.validate(&cli.target, &cli.monthyear_column)?;
    print_features(&features);

    if features.is_empty() {
        print_warning("No feature columns to diagnose; only target pages will be produced");
    }

    // Step 3: Aggregate
    print_step_header(3, "Aggregate by Month and Target");
    let step_start = Instant::now();
    let table = RowTable::new(&df, &cli.monthyear_column, &cli.target)?;

    let unkeyed_rows = table.unkeyed_rows();
    if unkeyed_rows > 0 {
        print_count(
            "row(s) without a month or target",
            unkeyed_rows,
            Some("(left out of month/target tables)"),
        );
    }

    let spinner = create_spinner("Aggregating feature values...");
    let tables = run_diagnostics(&table, &features)?;
    let overview = overview_features(&table, &features)?;
    finish_with_success(
        &spinner,
        &format!("{} count record(s) computed", tables.feature_counts.len()),
    );

    let months = table.months().len();
    summary.unkeyed_rows = unkeyed_rows;
    summary.months = months;
    let aggregate_elapsed = step_start.elapsed();
    summary.set_aggregate_time(aggregate_elapsed);
    print_step_time(aggregate_elapsed);

    // Step 4: Plan chart pages
    print_step_header(4, "Plan Chart Pages");
    let step_start = Instant::now();
    let options = PagePlanOptions {
        event_value: cli.event_value.clone(),
        rotate_x_labels: cli.rotate_x_labels,
    };
    let document = plan_pages(&tables, &features, &cli.target, &options);
    print_count("chart page(s)", document.page_count(), None);
    if let Some(event) = &document.event_value {
        print_info(&format!("Proportions drawn for {}={}", cli.target, event));
    }
    summary.pages = document.page_count();
    let plan_elapsed = step_start.elapsed();
    summary.set_plan_time(plan_elapsed);
    print_step_time(plan_elapsed);

    // Step 5: Save outputs
    print_step_header(5, "Save Results");
    let step_start = Instant::now();
    let report = DiagnosticsReport::new(
        ReportParams {
            input_file: cli.input.display().to_string(),
            target_column: cli.target.clone(),
            monthyear_column: cli.monthyear_column.clone(),
            features: features.clone(),
            rows,
            unkeyed_rows,
            months,
        },
        overview.clone(),
        tables,
        &document,
    );

    let spinner = create_spinner("Writing output files...");
    let files = write_diagnostics_outputs(&report, &document, &output_dir, &cli.output_stem())?;
    if cli.no_zip {
        finish_with_success(
            &spinner,
            &format!("Wrote {} file(s) to {}", files.len(), output_dir.display()),
        );
    } else {
        let zip_path = cli.zip_path();
        package_diagnostics(&files, &zip_path)?;
        finish_with_success(&spinner, &format!("Saved to {}", zip_path.display()));
    }
    let save_elapsed = step_start.elapsed();
    summary.set_save_time(save_elapsed);
    print_step_time(save_elapsed);

    summary.overview = overview;
    summary.display();

    print_completion();

    Ok(())
}
