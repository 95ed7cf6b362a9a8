//! Parser for the reasoning evaluator's text report.
//!
//! The evaluator prints lines such as
//!
//! ```text
//! step_level_validity_scores: [0.91, 0.84, 0.12]
//! step_level_redundancy_scores: [0.05, 0.10, 0.40]
//! solution_level_validity_scores: 0.12
//! solution_level_redundancy_scores: 0.40
//! ```
//!
//! interleaved with arbitrary log output. Parsing never fails as a whole: a
//! field that is missing or malformed stays absent (or empty).

use serde::{Deserialize, Serialize};

use crate::model::OutputRecord;
use crate::naming::ResponseKey;

pub const STEP_VALIDITY_LABEL: &str = "step_level_validity_scores:";
pub const STEP_REDUNDANCY_LABEL: &str = "step_level_redundancy_scores:";
pub const SOLUTION_VALIDITY_LABEL: &str = "solution_level_validity_scores:";
pub const SOLUTION_REDUNDANCY_LABEL: &str = "solution_level_redundancy_scores:";

/// Scores extracted from one evaluator run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub step_level_validity_scores: Vec<f64>,
    pub step_level_redundancy_scores: Vec<f64>,
    pub solution_level_validity_score: Option<f64>,
    pub solution_level_redundancy_score: Option<f64>,
}

impl ScoreReport {
    /// True when no field was recovered from the report.
    pub fn is_empty(&self) -> bool {
        self.step_level_validity_scores.is_empty()
            && self.step_level_redundancy_scores.is_empty()
            && self.solution_level_validity_score.is_none()
            && self.solution_level_redundancy_score.is_none()
    }

    /// Attach the scores to the response they were computed for.
    pub fn into_record(self, key: &ResponseKey) -> OutputRecord {
        OutputRecord {
            prompt_type: key.prompt_type.clone(),
            prompt_input_type: key.input_tag,
            problem_number: key.problem_number,
            iteration: key.iteration,
            solution_level_validity_score: self.solution_level_validity_score,
            solution_level_redundancy_score: self.solution_level_redundancy_score,
            step_level_validity_scores: self.step_level_validity_scores,
            step_level_redundancy_scores: self.step_level_redundancy_scores,
        }
    }
}

/// Extract the four score fields from the evaluator's captured stdout.
pub fn parse_score_report(output: &str) -> ScoreReport {
    let mut report = ScoreReport::default();

    for line in output.lines() {
        if line.contains(STEP_VALIDITY_LABEL) {
            match parse_sequence(value_after_colon(line)) {
                Ok(scores) => report.step_level_validity_scores = scores,
                Err(e) => tracing::warn!("error parsing step validity: {e}"),
            }
        } else if line.contains(STEP_REDUNDANCY_LABEL) {
            match parse_sequence(value_after_colon(line)) {
                Ok(scores) => report.step_level_redundancy_scores = scores,
                Err(e) => tracing::warn!("error parsing step redundancy: {e}"),
            }
        } else if line.contains(SOLUTION_VALIDITY_LABEL) {
            if let Some(score) = parse_scalar(value_after_colon(line)) {
                report.solution_level_validity_score = Some(score);
            }
        } else if line.contains(SOLUTION_REDUNDANCY_LABEL) {
            if let Some(score) = parse_scalar(value_after_colon(line)) {
                report.solution_level_redundancy_score = Some(score);
            }
        }
    }

    report
}

fn value_after_colon(line: &str) -> &str {
    line.split_once(':').map(|(_, v)| v).unwrap_or("").trim()
}

/// Parse a solution-level score. NaN and garbage both mean "absent".
fn parse_scalar(value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(v) if !v.is_nan() => Some(v),
        Ok(_) => {
            tracing::debug!("dropping NaN solution score");
            None
        }
        Err(e) => {
            tracing::debug!("dropping unparseable solution score {value:?}: {e}");
            None
        }
    }
}

/// Parse a literal number sequence such as `[0.9, 0.8]` or `(1, 2e-3,)`.
fn parse_sequence(value: &str) -> Result<Vec<f64>, String> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .or_else(|| value.strip_prefix('(').and_then(|v| v.strip_suffix(')')))
        .ok_or_else(|| format!("not a sequence literal: {value:?}"))?;

    let inner = inner.trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    let inner = inner.strip_suffix(',').unwrap_or(inner);

    inner
        .split(',')
        .map(|item| {
            let item = item.trim();
            match item.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(format!("invalid number {item:?} in {value:?}")),
            }
        })
        .collect()
}
