//! Reasoning scorers: an external evaluator process and a canned mock.

use std::io::Write;
use std::process::Stdio;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use reasonbench_core::model::ModelSize;
use reasonbench_core::score_report::{parse_score_report, ScoreReport};
use reasonbench_core::traits::{ReasoningScorer, ScoreRequest};

/// Scores responses by running an external evaluator once per response.
///
/// The evaluator is invoked as
/// `{program} {args..} --model_name_or_path M --model_size S --question Q --steps_file F`
/// where `F` holds one step per line. Its stdout is parsed as a score report.
#[derive(Debug, Clone)]
pub struct CommandScorer {
    program: String,
    args: Vec<String>,
    model_name_or_path: String,
    model_size: ModelSize,
    timeout: Duration,
}

impl CommandScorer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            model_name_or_path: "GAIR/ReasonEval-7B".to_string(),
            model_size: ModelSize::default(),
            timeout: Duration::from_secs(600),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_model(mut self, model_name_or_path: impl Into<String>, size: ModelSize) -> Self {
        self.model_name_or_path = model_name_or_path.into();
        self.model_size = size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn write_steps_file(steps: &[String]) -> Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("reasonbench-steps-")
            .suffix(".txt")
            .tempfile()
            .context("failed to create steps file")?;
        for step in steps {
            writeln!(file, "{step}").context("failed to write steps file")?;
        }
        file.flush().context("failed to write steps file")?;
        Ok(file)
    }
}

#[async_trait]
impl ReasoningScorer for CommandScorer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn score(&self, request: &ScoreRequest) -> Result<ScoreReport> {
        let start = Instant::now();
        let steps_file = Self::write_steps_file(&request.steps)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--model_name_or_path")
            .arg(&self.model_name_or_path)
            .arg("--model_size")
            .arg(self.model_size.as_str())
            .arg("--question")
            .arg(&request.question)
            .arg("--steps_file")
            .arg(steps_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .with_context(|| format!("{} timed out after {:?}", self.program, self.timeout))?
            .with_context(|| format!("failed to run {}", self.program))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                status = %output.status,
                stderr = %stderr.trim(),
                "{} exited unsuccessfully; parsing whatever it printed",
                self.program
            );
        }

        let report = parse_score_report(&stdout);
        if report.is_empty() {
            tracing::warn!("{} printed no recognisable scores", self.program);
        }
        tracing::debug!(
            steps = request.steps.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scored response"
        );
        Ok(report)
    }
}

/// Report printed by [`MockScorer::default`].
pub const MOCK_REPORT: &str = "\
step_level_validity_scores: [0.9, 0.8]
step_level_redundancy_scores: [0.1, 0.2]
solution_level_validity_scores: 0.8
solution_level_redundancy_scores: 0.2
";

/// A scorer that answers every request with the same report text.
pub struct MockScorer {
    output: String,
    call_count: AtomicU32,
}

impl MockScorer {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::new(MOCK_REPORT)
    }
}

#[async_trait]
impl ReasoningScorer for MockScorer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn score(&self, _request: &ScoreRequest) -> Result<ScoreReport> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(parse_score_report(&self.output))
    }
}
