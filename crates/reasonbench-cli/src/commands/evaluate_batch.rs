//! The `reasonbench evaluate-batch` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use reasonbench_core::problems::load_problems;
use reasonbench_core::results_log::ResultsLog;
use reasonbench_providers::config::load_config_from;
use reasonbench_runner::evaluate_iterations;

use super::{command_scorer, fmt_score};

pub async fn execute(
    problems_path: PathBuf,
    iterations: PathBuf,
    results_dir: PathBuf,
    results_log: PathBuf,
    repeats: u32,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(repeats >= 1, "repeats must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let problems = load_problems(&problems_path)?;
    let scorer = command_scorer(&config.scorer, None, None);
    let log = ResultsLog::new(results_log);

    let results =
        evaluate_iterations(&problems, &scorer, &iterations, &results_dir, &log, repeats).await?;

    if results.is_empty() {
        println!("No outputs_* directories found in {}", iterations.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Iteration", "Records", "Mean Validity", "Summary"]);
    for result in &results {
        let scores: Vec<f64> = result
            .records
            .iter()
            .filter_map(|r| r.solution_level_validity_score)
            .collect();
        let mean = (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);

        table.add_row(vec![
            Cell::new(&result.name),
            Cell::new(result.records.len()),
            Cell::new(fmt_score(mean)),
            Cell::new(result.summary_path.display()),
        ]);
    }
    println!("{table}");

    Ok(())
}
