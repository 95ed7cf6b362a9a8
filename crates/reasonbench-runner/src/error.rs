//! Typed failures of the generation and evaluation passes.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("File not found: {}", path.display())]
    ResponseMissing { path: PathBuf },

    #[error("output path exists and is not a directory: {}", path.display())]
    OutputNotDirectory { path: PathBuf },

    #[error("invalid problem at index {index}")]
    InvalidProblem {
        index: usize,
        #[source]
        source: reasonbench_core::error::PromptError,
    },
}
