//! The `reasonbench metrics` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use reasonbench_core::statistics::{
    compute_accuracy, load_outcomes, load_scored_records, MetricsReport,
};

use super::fmt_score;

pub fn execute(results_log: PathBuf, threshold: f64, format: String) -> Result<()> {
    anyhow::ensure!(threshold.is_finite(), "threshold must be a finite number");

    let outcomes = load_outcomes(&results_log, threshold)?;

    match format.as_str() {
        "text" => {
            print!("{}", compute_accuracy(&outcomes).render_text());
        }
        "json" => {
            let records = load_scored_records(&results_log)?;
            let report = MetricsReport::new(threshold, &outcomes, &records);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "table" => {
            let records = load_scored_records(&results_log)?;
            let report = MetricsReport::new(threshold, &outcomes, &records);
            print_table(&report);
        }
        other => anyhow::bail!("unknown format: {other} (expected text, json, or table)"),
    }

    Ok(())
}

fn print_table(report: &MetricsReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "Prompt Type",
        "Correct",
        "Total",
        "Accuracy",
        "Mean Validity",
        "Mean Redundancy",
        "Mean Steps",
    ]);

    for category in &report.accuracy.per_category {
        let scores = report.scores.iter().find(|s| s.category == category.category);
        table.add_row(vec![
            Cell::new(&category.category),
            Cell::new(category.correct),
            Cell::new(category.total),
            Cell::new(percent(category.accuracy())),
            Cell::new(fmt_score(scores.and_then(|s| s.mean_solution_validity))),
            Cell::new(fmt_score(scores.and_then(|s| s.mean_solution_redundancy))),
            Cell::new(
                scores
                    .map(|s| format!("{:.1}", s.mean_step_count))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    if let Some(overall) = &report.accuracy.overall {
        table.add_row(vec![
            Cell::new(&overall.category),
            Cell::new(overall.correct),
            Cell::new(overall.total),
            Cell::new(percent(overall.accuracy())),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
        ]);
    }

    println!("{table}");
    println!(
        "threshold {} | generated {}",
        report.threshold,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| "-".to_string())
}
