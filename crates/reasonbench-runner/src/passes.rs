//! The generation pass and the evaluation passes.
//!
//! Both sides derive response filenames from [`assign_problem_numbers`] over
//! the same ordered problem list; nothing else links a response file to the
//! problem it answers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use reasonbench_core::model::{OutputRecord, ProblemSpec};
use reasonbench_core::naming::{assign_problem_numbers, ResponseKey};
use reasonbench_core::prompt;
use reasonbench_core::results_log::{write_batch_summary, ResultsLog};
use reasonbench_core::traits::{
    GenerateRequest, ImageAttachment, LlmProvider, ReasoningScorer, ScoreRequest,
    DEFAULT_SYSTEM_PROMPT,
};

use crate::error::RunnerError;

/// Prefix of iteration directories picked up by [`evaluate_iterations`].
pub const ITERATION_DIR_PREFIX: &str = "outputs_";

/// Knobs for the generation pass.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    /// Falls back to [`DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,
    /// Responses generated per problem.
    pub repeats: u32,
    /// Directory that relative image paths resolve against.
    pub base_dir: PathBuf,
}

impl GenerationSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: reasonbench_core::traits::DEFAULT_TEMPERATURE,
            max_tokens: None,
            system_prompt: None,
            repeats: 1,
            base_dir: PathBuf::from("."),
        }
    }
}

/// What a generation pass produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationSummary {
    pub files: Vec<PathBuf>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_latency_ms: u64,
}

/// Generate and store one response per problem and repetition.
pub async fn generate_responses(
    problems: &[ProblemSpec],
    provider: &dyn LlmProvider,
    settings: &GenerationSettings,
    output_dir: &Path,
) -> Result<GenerationSummary> {
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(RunnerError::OutputNotDirectory {
            path: output_dir.to_path_buf(),
        }
        .into());
    }
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let system_prompt = settings
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
    let mut summary = GenerationSummary::default();

    for assignment in assign_problem_numbers(problems) {
        let problem = &problems[assignment.index];
        let rendered = prompt::render(
            &problem.prompt_type,
            &problem.content,
            problem.prompt_tailoring.as_deref(),
        )
        .map_err(|source| RunnerError::InvalidProblem {
            index: assignment.index,
            source,
        })?;

        let image = problem
            .image
            .as_ref()
            .map(|path| ImageAttachment::from_path(&settings.base_dir.join(path)))
            .transpose()?;

        for key in assignment.keys(settings.repeats) {
            let request = GenerateRequest {
                model: settings.model.clone(),
                prompt: rendered.clone(),
                system_prompt: Some(system_prompt.clone()),
                image: image.clone(),
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
            };

            let response = provider
                .generate(&request)
                .await
                .with_context(|| format!("generation failed for {}", key.file_stem()))?;

            let path = key.path_in(output_dir);
            std::fs::write(&path, &response.content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("saved {}", path.display());

            summary.prompt_tokens += u64::from(response.token_usage.prompt_tokens);
            summary.completion_tokens += u64::from(response.token_usage.completion_tokens);
            summary.total_latency_ms += response.latency_ms;
            summary.files.push(path);
        }
    }

    Ok(summary)
}

/// Score the stored response for `key`.
pub async fn evaluate_response(
    scorer: &dyn ReasoningScorer,
    question: &str,
    key: &ResponseKey,
    responses_dir: &Path,
) -> Result<OutputRecord> {
    let path = key.path_in(responses_dir);
    let response = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RunnerError::ResponseMissing { path }.into());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let request = ScoreRequest::from_response(question, &response);
    let report = scorer
        .score(&request)
        .await
        .with_context(|| format!("failed to score {}", path.display()))?;

    info!(steps = request.steps.len(), "evaluated {}", key.file_name());
    Ok(report.into_record(key))
}

/// Evaluate every response in `responses_dir` into a fresh results log.
///
/// Missing or unscorable responses are skipped with a warning. Returns the
/// log's contents after the pass.
pub async fn evaluate_directory(
    problems: &[ProblemSpec],
    scorer: &dyn ReasoningScorer,
    responses_dir: &Path,
    results_log: &ResultsLog,
    repeats: u32,
) -> Result<Vec<OutputRecord>> {
    results_log.truncate()?;

    for assignment in assign_problem_numbers(problems) {
        let question = &problems[assignment.index].content;
        for key in assignment.keys(repeats) {
            match evaluate_response(scorer, question, &key, responses_dir).await {
                Ok(record) => results_log.append(&record)?,
                Err(e) => match e.downcast_ref::<RunnerError>() {
                    Some(RunnerError::ResponseMissing { path }) => {
                        warn!("skipping missing response {}", path.display());
                    }
                    _ => warn!("skipping {}: {e:#}", key.file_name()),
                },
            }
        }
    }

    results_log.read_all()
}

/// One evaluated iteration directory.
#[derive(Debug, Clone, Serialize)]
pub struct IterationResult {
    /// Directory name, e.g. `outputs_3`.
    pub name: String,
    /// Where the batch summary was written.
    pub summary_path: PathBuf,
    pub records: Vec<OutputRecord>,
}

/// Evaluate every `outputs_*` directory under `iterations_root`, in name
/// order, writing `{results_dir}/{name}.json` for each.
pub async fn evaluate_iterations(
    problems: &[ProblemSpec],
    scorer: &dyn ReasoningScorer,
    iterations_root: &Path,
    results_dir: &Path,
    results_log: &ResultsLog,
    repeats: u32,
) -> Result<Vec<IterationResult>> {
    let entries = std::fs::read_dir(iterations_root)
        .with_context(|| format!("failed to read {}", iterations_root.display()))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(ITERATION_DIR_PREFIX) && entry.path().is_dir() {
            dirs.push((name, entry.path()));
        }
    }
    dirs.sort();

    if dirs.is_empty() {
        warn!(
            "no {ITERATION_DIR_PREFIX}* directories under {}",
            iterations_root.display()
        );
    }

    let mut results = Vec::with_capacity(dirs.len());
    for (name, dir) in dirs {
        info!("evaluating {}", dir.display());
        let records = evaluate_directory(problems, scorer, &dir, results_log, repeats).await?;
        let summary_path = results_dir.join(format!("{name}.json"));
        write_batch_summary(&summary_path, &records)?;
        info!(records = records.len(), "wrote {}", summary_path.display());
        results.push(IterationResult {
            name,
            summary_path,
            records,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::MockScorer;
    use reasonbench_core::model::InputTag;
    use reasonbench_providers::mock::{MockProvider, MOCK_RESPONSE_PREFIX};

    fn problems() -> Vec<ProblemSpec> {
        vec![
            ProblemSpec::text("SCoT", "Find det([[1,2],[3,4]])."),
            ProblemSpec::text("Persona", "Is {v1, v2} a basis of R^2?"),
            ProblemSpec::text("SCoT", "Find the rank of A."),
        ]
    }

    fn settings() -> GenerationSettings {
        GenerationSettings::new("mock-model")
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn generate_writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("outputs");
        let provider = MockProvider::new();

        let summary = generate_responses(&problems(), &provider, &settings(), &out)
            .await
            .unwrap();

        assert_eq!(summary.files.len(), 3);
        assert_eq!(
            names(&out),
            vec!["Persona_text_01_01.txt", "SCoT_text_01_01.txt", "SCoT_text_02_01.txt"]
        );
        let text = std::fs::read_to_string(out.join("SCoT_text_02_01.txt")).unwrap();
        assert!(text.starts_with(MOCK_RESPONSE_PREFIX));
        assert!(text.contains("Find the rank of A."));

        let request = provider.last_request().unwrap();
        assert_eq!(request.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
        assert!(request.image.is_none());
    }

    #[tokio::test]
    async fn generate_repeats_share_problem_number() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new();
        let mut settings = settings();
        settings.repeats = 2;

        generate_responses(&problems()[..1], &provider, &settings, dir.path())
            .await
            .unwrap();

        assert_eq!(
            names(dir.path()),
            vec!["SCoT_text_01_01.txt", "SCoT_text_01_02.txt"]
        );
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn generate_attaches_image_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/m.png"), b"png").unwrap();

        let mut problem = ProblemSpec::text("Chain-of-Table", "Reduce the matrix shown.");
        problem.image = Some(PathBuf::from("images/m.png"));

        let provider = MockProvider::new();
        let mut settings = settings();
        settings.base_dir = dir.path().to_path_buf();
        let out = dir.path().join("outputs");

        generate_responses(&[problem], &provider, &settings, &out)
            .await
            .unwrap();

        assert_eq!(names(&out), vec!["Chain-of-Table_image_01_01.txt"]);
        let image = provider.last_request().unwrap().image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "cG5n");
    }

    #[tokio::test]
    async fn generate_missing_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut problem = ProblemSpec::text("SCoT", "See image.");
        problem.image = Some(PathBuf::from("missing.png"));
        let mut settings = settings();
        settings.base_dir = dir.path().to_path_buf();

        let err = generate_responses(&[problem], &MockProvider::new(), &settings, dir.path())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("missing.png"));
    }

    #[tokio::test]
    async fn generate_rejects_unknown_prompt_type() {
        let dir = tempfile::tempdir().unwrap();
        let problems = vec![ProblemSpec::text("CoT", "Find det(A).")];

        let err = generate_responses(&problems, &MockProvider::new(), &settings(), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunnerError>(),
            Some(RunnerError::InvalidProblem { index: 0, .. })
        ));
        assert!(names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn generate_output_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("outputs");
        std::fs::write(&file, "").unwrap();

        let err = generate_responses(&problems(), &MockProvider::new(), &settings(), &file)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunnerError>(),
            Some(RunnerError::OutputNotDirectory { .. })
        ));
    }

    #[tokio::test]
    async fn evaluate_response_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let key = ResponseKey {
            prompt_type: "SCoT".into(),
            input_tag: InputTag::Text,
            problem_number: 1,
            iteration: 1,
        };

        let err = evaluate_response(&MockScorer::default(), "q", &key, dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("File not found: "));
        assert!(err.to_string().ends_with("SCoT_text_01_01.txt"));
    }

    #[tokio::test]
    async fn evaluate_response_builds_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Persona_image_03_02.txt"), "1. a\n2. b\n").unwrap();
        let key = ResponseKey {
            prompt_type: "Persona".into(),
            input_tag: InputTag::Image,
            problem_number: 3,
            iteration: 2,
        };

        let record = evaluate_response(&MockScorer::default(), "q", &key, dir.path())
            .await
            .unwrap();
        assert_eq!(record.prompt_type, "Persona");
        assert_eq!(record.prompt_input_type, InputTag::Image);
        assert_eq!(record.problem_number, 3);
        assert_eq!(record.iteration, 2);
        assert_eq!(record.solution_level_validity_score, Some(0.8));
    }

    #[tokio::test]
    async fn evaluate_directory_skips_missing_and_resets_log() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("outputs");
        generate_responses(&problems(), &MockProvider::new(), &settings(), &out)
            .await
            .unwrap();
        std::fs::remove_file(out.join("Persona_text_01_01.txt")).unwrap();

        let log = ResultsLog::new(dir.path().join("eval_results.json"));
        std::fs::write(log.path(), "stale line that is not json\n").unwrap();

        let scorer = MockScorer::default();
        let records = evaluate_directory(&problems(), &scorer, &out, &log, 1)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(scorer.call_count(), 2);
        let stems: Vec<_> = records
            .iter()
            .map(|r| (r.prompt_type.as_str(), r.problem_number))
            .collect();
        assert_eq!(stems, vec![("SCoT", 1), ("SCoT", 2)]);
    }

    #[tokio::test]
    async fn evaluate_iterations_writes_one_summary_per_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("iterations");
        for name in ["outputs_2", "outputs_1"] {
            generate_responses(&problems(), &MockProvider::new(), &settings(), &root.join(name))
                .await
                .unwrap();
        }
        std::fs::create_dir_all(root.join("notes")).unwrap();
        std::fs::write(root.join("outputs_readme.txt"), "").unwrap();

        let results_dir = dir.path().join("results");
        let log = ResultsLog::new(dir.path().join("eval_results.json"));
        let results = evaluate_iterations(
            &problems(),
            &MockScorer::default(),
            &root,
            &results_dir,
            &log,
            1,
        )
        .await
        .unwrap();

        let evaluated: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(evaluated, vec!["outputs_1", "outputs_2"]);
        assert_eq!(names(&results_dir), vec!["outputs_1.json", "outputs_2.json"]);
        let summary = reasonbench_core::results_log::load_batch_summary(
            &results_dir.join("outputs_1.json"),
        )
        .unwrap();
        assert_eq!(summary.len(), 3);
    }

    #[tokio::test]
    async fn evaluate_iterations_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultsLog::new(dir.path().join("log.json"));
        let err = evaluate_iterations(
            &problems(),
            &MockScorer::default(),
            &dir.path().join("nope"),
            dir.path(),
            &log,
            1,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
