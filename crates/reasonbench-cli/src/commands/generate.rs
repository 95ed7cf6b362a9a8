//! The `reasonbench generate` command.

use std::path::PathBuf;

use anyhow::Result;

use reasonbench_core::problems::{base_dir, load_problems, validate_problems};
use reasonbench_core::traits::LlmProvider;
use reasonbench_providers::config::load_config_from;
use reasonbench_providers::create_provider;
use reasonbench_providers::mock::MockProvider;
use reasonbench_runner::{generate_responses, GenerationSettings};

pub struct GenerateArgs {
    pub problems: PathBuf,
    pub output: PathBuf,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub temperature: Option<f64>,
    pub repeats: u32,
    pub test_mode: bool,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    anyhow::ensure!(args.repeats >= 1, "repeats must be at least 1");

    let config = load_config_from(args.config.as_deref())?;
    let temperature = args.temperature.unwrap_or(config.temperature);
    anyhow::ensure!(
        (0.0..=2.0).contains(&temperature),
        "temperature must be between 0.0 and 2.0"
    );

    let problems = load_problems(&args.problems)?;
    let base = base_dir(&args.problems).to_path_buf();
    for w in validate_problems(&problems, &base) {
        tracing::warn!("problem {}: {}", w.index, w.message);
    }

    let provider: Box<dyn LlmProvider> = if args.test_mode {
        Box::new(MockProvider::new())
    } else {
        let name = args
            .provider
            .unwrap_or_else(|| config.default_provider.clone());
        match config.providers.get(&name) {
            Some(pconfig) => create_provider(&name, pconfig)?,
            None => anyhow::bail!(
                "provider '{}' not found in config. Available: {:?}",
                name,
                config.providers.keys().collect::<Vec<_>>()
            ),
        }
    };

    let settings = GenerationSettings {
        model: args.model.unwrap_or_else(|| config.default_model.clone()),
        temperature,
        max_tokens: config.max_tokens,
        system_prompt: config.system_prompt.clone(),
        repeats: args.repeats,
        base_dir: base,
    };

    eprintln!(
        "reasonbench v{}: generating {} problems x {} repeats with {}/{}",
        env!("CARGO_PKG_VERSION"),
        problems.len(),
        settings.repeats,
        provider.name(),
        settings.model,
    );

    let summary = generate_responses(&problems, provider.as_ref(), &settings, &args.output).await?;

    println!(
        "Saved {} responses to {}",
        summary.files.len(),
        args.output.display()
    );
    println!(
        "Tokens: {} prompt, {} completion ({}ms total)",
        summary.prompt_tokens, summary.completion_tokens, summary.total_latency_ms
    );

    Ok(())
}
