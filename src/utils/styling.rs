//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::FeatureLists;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static DONE: Emoji<'_, '_> = Emoji("✨ ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

/// Width of the configuration card, borders included
const CARD_WIDTH: usize = 60;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("featdiag").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Feature diagnostics by month and target").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Configuration shown in the card before a run
pub struct RunConfig<'a> {
    pub input: &'a Path,
    pub target: &'a str,
    pub monthyear_column: &'a str,
    pub date_column: Option<&'a str>,
    pub output_dir: &'a Path,
    pub event_value: Option<&'a str>,
}

/// Print configuration card
pub fn print_config(config: &RunConfig) {
    let inner = CARD_WIDTH - 2;
    let line = "─".repeat(inner);
    let field = inner - 14;

    let month_source = match config.date_column {
        Some(date) => format!("{} (from {})", config.monthyear_column, date),
        None => config.monthyear_column.to_string(),
    };

    println!("    ┌{}┐", line);
    println!("    │ {:<width$}│", style("Configuration").cyan().bold(), width = inner - 1);
    println!("    ├{}┤", line);
    print_card_row(&FOLDER, "Input:", &truncate_path(config.input, field), field);
    print_card_row(&TARGET, "Target:", &truncate_string(config.target, field), field);
    print_card_row(&CALENDAR, "Month:", &truncate_string(&month_source, field), field);
    print_card_row(&SAVE, "Output:", &truncate_path(config.output_dir, field), field);
    print_card_row(
        &CHART,
        "Event:",
        config.event_value.unwrap_or("(greatest target value)"),
        field,
    );
    println!("    └{}┘", line);
    println!();
}

fn print_card_row(icon: &Emoji, label: &str, value: &str, width: usize) {
    println!("    │  {}{:<8} {:<width$}│", icon, label, value, width = width);
}

/// Print the resolved feature lists
pub fn print_features(features: &FeatureLists) {
    println!(
        "      {} categorical: {}",
        style(features.categorical.len()).yellow().bold(),
        style(preview_list(&features.categorical, 6)).dim()
    );
    println!(
        "      {} continuous:  {}",
        style(features.continuous.len()).yellow().bold(),
        style(preview_list(&features.continuous, 6)).dim()
    );
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print elapsed time for a step
pub fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "    {}",
        style(format!("({:.2}s)", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        DONE,
        style("Diagnostics complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn preview_list(items: &[String], max: usize) -> String {
    if items.len() <= max {
        items.join(", ")
    } else {
        format!("{}, ... (+{} more)", items[..max].join(", "), items.len() - max)
    }
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("/very/long/path/data.csv", 12), ".../data.csv");
    }

    #[test]
    fn test_preview_list() {
        let items: Vec<String> = (0..8).map(|i| format!("f{}", i)).collect();
        assert_eq!(preview_list(&items[..2], 6), "f0, f1");
        assert_eq!(preview_list(&items, 6), "f0, f1, f2, f3, f4, f5, ... (+2 more)");
    }
}
