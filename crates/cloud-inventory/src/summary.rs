//! End-of-run summary printed to stdout

use crate::aggregator::AggregationOutcome;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use std::path::Path;

fn status_cell(status: &str) -> Cell {
    let color = match status {
        "ok" => Color::Green,
        "partial" => Color::Yellow,
        _ => Color::Red,
    };
    Cell::new(status).fg(color)
}

/// One line per category: rows, warnings, and status.
pub fn summary_table(outcome: &AggregationOutcome) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Category"),
            Cell::new("Rows"),
            Cell::new("Warnings"),
            Cell::new("Status"),
            Cell::new("Time (s)"),
        ]);

    for summary in &outcome.summaries {
        table.add_row(vec![
            Cell::new(&summary.label),
            Cell::new(summary.rows).set_alignment(CellAlignment::Right),
            Cell::new(summary.warnings.len()).set_alignment(CellAlignment::Right),
            status_cell(summary.status()),
            Cell::new(format!("{:.1}", summary.elapsed.as_secs_f64()))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn print_summary(outcome: &AggregationOutcome, path: &Path) {
    println!("\n=== Inventory Summary ===\n");
    println!("{}", summary_table(outcome));

    for summary in outcome.failed() {
        if let Some(error) = &summary.error {
            println!("  {} failed: {error}", summary.label);
        }
    }

    let warnings = outcome.total_warnings();
    if warnings > 0 {
        println!("\n{warnings} warning(s); affected cells show N/A");
        for summary in &outcome.summaries {
            for warning in &summary.warnings {
                println!("  [{}] {warning}", summary.label);
            }
        }
    }

    println!(
        "\nReport: {} ({} rows)",
        path.display(),
        outcome.bundle.total_rows()
    );
}
