pub mod evaluate;
pub mod evaluate_batch;
pub mod generate;
pub mod init;
pub mod metrics;
pub mod validate;

use std::time::Duration;

use reasonbench_core::model::ModelSize;
use reasonbench_providers::ScorerConfig;
use reasonbench_runner::CommandScorer;

/// Build the external evaluator from config, with command-line overrides.
pub fn command_scorer(
    config: &ScorerConfig,
    model_name_or_path: Option<String>,
    model_size: Option<ModelSize>,
) -> CommandScorer {
    CommandScorer::new(config.program.clone())
        .with_args(config.args.clone())
        .with_model(
            model_name_or_path.unwrap_or_else(|| config.model_name_or_path.clone()),
            model_size.unwrap_or(config.model_size),
        )
        .with_timeout(Duration::from_secs(config.timeout_secs))
}

/// Format an optional score for display.
pub fn fmt_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{s:.3}"))
        .unwrap_or_else(|| "-".to_string())
}
