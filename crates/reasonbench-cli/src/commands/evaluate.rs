//! The `reasonbench evaluate` command.

use std::path::PathBuf;

use anyhow::Result;

use reasonbench_core::model::{InputTag, ModelSize};
use reasonbench_core::naming::ResponseKey;
use reasonbench_core::results_log::ResultsLog;
use reasonbench_providers::config::load_config_from;
use reasonbench_runner::evaluate_response;

use super::{command_scorer, fmt_score};

pub struct EvaluateArgs {
    pub question: String,
    pub prompt_type: String,
    pub input_tag: InputTag,
    pub problem_number: u32,
    pub iteration: u32,
    pub responses_dir: PathBuf,
    pub model_name_or_path: Option<String>,
    pub model_size: Option<ModelSize>,
    pub results_log: PathBuf,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: EvaluateArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let scorer = command_scorer(&config.scorer, args.model_name_or_path, args.model_size);

    let key = ResponseKey {
        prompt_type: args.prompt_type,
        input_tag: args.input_tag,
        problem_number: args.problem_number,
        iteration: args.iteration,
    };

    let record = evaluate_response(&scorer, &args.question, &key, &args.responses_dir).await?;
    ResultsLog::new(args.results_log.clone()).append(&record)?;

    println!("{}", key.file_stem());
    println!(
        "  solution validity:   {}",
        fmt_score(record.solution_level_validity_score)
    );
    println!(
        "  solution redundancy: {}",
        fmt_score(record.solution_level_redundancy_score)
    );
    println!("  steps scored:        {}", record.step_level_validity_scores.len());
    println!("Appended to {}", args.results_log.display());

    Ok(())
}
