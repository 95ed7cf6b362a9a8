//! reasonbench CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use reasonbench_core::model::{InputTag, ModelSize};
use reasonbench_core::problems::DEFAULT_PROBLEMS_FILE;
use reasonbench_core::results_log::DEFAULT_RESULTS_LOG;
use reasonbench_core::statistics::DEFAULT_CORRECTNESS_THRESHOLD;

mod commands;

#[derive(Parser)]
#[command(
    name = "reasonbench",
    version,
    about = "Linear-algebra prompting eval harness"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate model responses for every problem
    Generate {
        /// Problems JSON file
        #[arg(long, default_value = DEFAULT_PROBLEMS_FILE)]
        problems: PathBuf,

        /// Directory receiving one text file per response
        #[arg(long, default_value = "outputs")]
        output: PathBuf,

        /// Model to query (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,

        /// Provider name from the config (defaults to the configured provider)
        #[arg(long)]
        provider: Option<String>,

        /// Sampling temperature (defaults to the configured temperature)
        #[arg(long)]
        temperature: Option<f64>,

        /// Responses generated per problem
        #[arg(long, default_value = "1")]
        repeats: u32,

        /// Write placeholder responses without calling any API
        #[arg(long)]
        test_mode: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a single stored response
    Evaluate {
        /// The problem statement
        #[arg(long)]
        question: String,

        /// Prompt type of the response
        #[arg(long = "prompt_type")]
        prompt_type: String,

        /// Input modality: text or image
        #[arg(long = "input_tag")]
        input_tag: InputTag,

        /// Problem number within (prompt type, input tag)
        #[arg(long = "problem_number")]
        problem_number: u32,

        /// Repetition number
        #[arg(long)]
        iteration: u32,

        /// Directory holding the response files
        #[arg(long = "responses_dir", default_value = "outputs")]
        responses_dir: PathBuf,

        /// Evaluator checkpoint (defaults to the configured one)
        #[arg(long = "model_name_or_path")]
        model_name_or_path: Option<String>,

        /// Evaluator size: 7B or 34B (defaults to the configured size)
        #[arg(long = "model_size")]
        model_size: Option<ModelSize>,

        /// Results log receiving the record
        #[arg(long, default_value = DEFAULT_RESULTS_LOG)]
        results_log: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score every outputs_* directory under an iterations root
    EvaluateBatch {
        /// Problems JSON file
        #[arg(long, default_value = DEFAULT_PROBLEMS_FILE)]
        problems: PathBuf,

        /// Directory containing outputs_* subdirectories
        #[arg(long, default_value = "iterations")]
        iterations: PathBuf,

        /// Directory receiving one summary per iteration
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,

        /// Results log, reset for each iteration
        #[arg(long, default_value = DEFAULT_RESULTS_LOG)]
        results_log: PathBuf,

        /// Responses per problem in each iteration
        #[arg(long, default_value = "1")]
        repeats: u32,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Report accuracy per prompt type from the results log
    Metrics {
        /// Results log to read
        #[arg(long, default_value = DEFAULT_RESULTS_LOG)]
        results_log: PathBuf,

        /// Minimum solution validity counted as correct
        #[arg(long, default_value_t = DEFAULT_CORRECTNESS_THRESHOLD)]
        threshold: f64,

        /// Output format: text, json, table
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check a problems file for common mistakes
    Validate {
        /// Problems JSON file
        #[arg(long, default_value = DEFAULT_PROBLEMS_FILE)]
        problems: PathBuf,
    },

    /// Create a starter config and problems file
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "reasonbench=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            problems,
            output,
            model,
            provider,
            temperature,
            repeats,
            test_mode,
            config,
        } => {
            commands::generate::execute(commands::generate::GenerateArgs {
                problems,
                output,
                model,
                provider,
                temperature,
                repeats,
                test_mode,
                config,
            })
            .await
        }
        Commands::Evaluate {
            question,
            prompt_type,
            input_tag,
            problem_number,
            iteration,
            responses_dir,
            model_name_or_path,
            model_size,
            results_log,
            config,
        } => {
            commands::evaluate::execute(commands::evaluate::EvaluateArgs {
                question,
                prompt_type,
                input_tag,
                problem_number,
                iteration,
                responses_dir,
                model_name_or_path,
                model_size,
                results_log,
                config,
            })
            .await
        }
        Commands::EvaluateBatch {
            problems,
            iterations,
            results_dir,
            results_log,
            repeats,
            config,
        } => {
            commands::evaluate_batch::execute(
                problems,
                iterations,
                results_dir,
                results_log,
                repeats,
                config,
            )
            .await
        }
        Commands::Metrics {
            results_log,
            threshold,
            format,
        } => commands::metrics::execute(results_log, threshold, format),
        Commands::Validate { problems } => commands::validate::execute(problems),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
