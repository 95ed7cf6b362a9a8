//! reasonbench-runner: Generation and evaluation passes.
//!
//! Drives an `LlmProvider` over the problem list to produce response files,
//! then runs a `ReasoningScorer` over those files to build the results log.

pub mod error;
pub mod passes;
pub mod scorer;

pub use error::RunnerError;
pub use passes::{
    evaluate_directory, evaluate_iterations, evaluate_response, generate_responses,
    GenerationSettings, GenerationSummary, IterationResult,
};
pub use scorer::{CommandScorer, MockScorer};
