//! Accuracy and score aggregation over evaluated responses.
//!
//! Categories are prompt types. Categories are reported in the order they
//! first appear, and empty inputs produce no ratios at all.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::OutputRecord;
use crate::results_log::read_json_lines;

/// Default solution-validity threshold for counting a response as correct.
pub const DEFAULT_CORRECTNESS_THRESHOLD: f64 = 0.5;

/// A labeled pass/fail result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(rename = "type")]
    pub category: String,
    pub correct: bool,
}

impl Outcome {
    /// Judge a scored response by its solution-level validity.
    ///
    /// A response without a validity score counts as incorrect.
    pub fn from_record(record: &OutputRecord, threshold: f64) -> Self {
        Self {
            category: record.prompt_type.clone(),
            correct: record
                .solution_level_validity_score
                .is_some_and(|v| v >= threshold),
        }
    }
}

/// A results log line: either an explicit outcome or a scored record.
#[derive(Deserialize)]
#[serde(untagged)]
enum LogEntry {
    Explicit(Outcome),
    Scored(OutputRecord),
}

/// Load outcomes from a JSON-lines results log.
///
/// Lines carrying a `correct` flag are taken as-is; scored records are judged
/// with `threshold`. A missing log yields no outcomes.
pub fn load_outcomes(path: &Path, threshold: f64) -> Result<Vec<Outcome>> {
    let entries: Vec<LogEntry> = read_json_lines(path)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            LogEntry::Explicit(outcome) => outcome,
            LogEntry::Scored(record) => Outcome::from_record(&record, threshold),
        })
        .collect())
}

/// Load only the scored records from a results log, skipping explicit outcomes.
pub fn load_scored_records(path: &Path) -> Result<Vec<OutputRecord>> {
    let entries: Vec<LogEntry> = read_json_lines(path)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            LogEntry::Scored(record) => Some(record),
            LogEntry::Explicit(_) => None,
        })
        .collect())
}

/// Correct/total counts for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAccuracy {
    pub category: String,
    pub correct: u32,
    pub total: u32,
}

impl CategoryAccuracy {
    /// Fraction correct, or `None` for an empty category.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| f64::from(self.correct) / f64::from(self.total))
    }

    fn line(&self) -> Option<String> {
        self.accuracy().map(|acc| {
            format!(
                "{}: {}/{} = {:.1}%",
                self.category,
                self.correct,
                self.total,
                acc * 100.0
            )
        })
    }
}

/// Accuracy grouped by category plus the overall figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub per_category: Vec<CategoryAccuracy>,
    /// `None` when there were no outcomes.
    pub overall: Option<CategoryAccuracy>,
}

impl AccuracyReport {
    /// Look up one category.
    pub fn category(&self, name: &str) -> Option<&CategoryAccuracy> {
        self.per_category.iter().find(|c| c.category == name)
    }

    /// Operator-facing text, one line per category and an overall line.
    pub fn render_text(&self) -> String {
        let mut out = String::from("=== Accuracy Metrics ===\n");
        for line in self.per_category.iter().filter_map(CategoryAccuracy::line) {
            out.push_str(&line);
            out.push('\n');
        }
        if let Some(line) = self.overall.as_ref().and_then(CategoryAccuracy::line) {
            out.push('\n');
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Group outcomes by category and compute per-category and overall accuracy.
pub fn compute_accuracy(outcomes: &[Outcome]) -> AccuracyReport {
    let mut per_category: Vec<CategoryAccuracy> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for outcome in outcomes {
        let pos = *positions
            .entry(outcome.category.as_str())
            .or_insert_with(|| {
                per_category.push(CategoryAccuracy {
                    category: outcome.category.clone(),
                    correct: 0,
                    total: 0,
                });
                per_category.len() - 1
            });
        let entry = &mut per_category[pos];
        entry.total += 1;
        entry.correct += u32::from(outcome.correct);
    }

    per_category.retain(|c| c.total > 0);

    let overall = (!per_category.is_empty()).then(|| CategoryAccuracy {
        category: "OVERALL".to_string(),
        correct: per_category.iter().map(|c| c.correct).sum(),
        total: per_category.iter().map(|c| c.total).sum(),
    });

    AccuracyReport {
        per_category,
        overall,
    }
}

/// Mean scores for one prompt type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub category: String,
    pub records: u32,
    /// Mean over records that have a validity score.
    pub mean_solution_validity: Option<f64>,
    /// Mean over records that have a redundancy score.
    pub mean_solution_redundancy: Option<f64>,
    pub mean_step_count: f64,
}

#[derive(Default)]
struct ScoreAccumulator {
    records: u32,
    validity_sum: f64,
    validity_count: u32,
    redundancy_sum: f64,
    redundancy_count: u32,
    steps: usize,
}

fn mean(sum: f64, count: u32) -> Option<f64> {
    (count > 0).then(|| sum / f64::from(count))
}

/// Mean solution-level scores and step counts per prompt type.
pub fn compute_score_summary(records: &[OutputRecord]) -> Vec<ScoreSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut acc: HashMap<&str, ScoreAccumulator> = HashMap::new();

    for record in records {
        let key = record.prompt_type.as_str();
        let entry = acc.entry(key).or_insert_with(|| {
            order.push(key);
            ScoreAccumulator::default()
        });
        entry.records += 1;
        if let Some(v) = record.solution_level_validity_score {
            entry.validity_sum += v;
            entry.validity_count += 1;
        }
        if let Some(r) = record.solution_level_redundancy_score {
            entry.redundancy_sum += r;
            entry.redundancy_count += 1;
        }
        entry.steps += record.step_level_validity_scores.len();
    }

    order
        .into_iter()
        .filter_map(|key| {
            let a = acc.get(key)?;
            Some(ScoreSummary {
                category: key.to_string(),
                records: a.records,
                mean_solution_validity: mean(a.validity_sum, a.validity_count),
                mean_solution_redundancy: mean(a.redundancy_sum, a.redundancy_count),
                mean_step_count: a.steps as f64 / f64::from(a.records.max(1)),
            })
        })
        .collect()
}

/// Everything the `metrics` command reports, in serializable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub created_at: DateTime<Utc>,
    pub threshold: f64,
    pub accuracy: AccuracyReport,
    pub scores: Vec<ScoreSummary>,
}

impl MetricsReport {
    pub fn new(threshold: f64, outcomes: &[Outcome], records: &[OutputRecord]) -> Self {
        Self {
            created_at: Utc::now(),
            threshold,
            accuracy: compute_accuracy(outcomes),
            scores: compute_score_summary(records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InputTag;

    fn outcome(category: &str, correct: bool) -> Outcome {
        Outcome {
            category: category.into(),
            correct,
        }
    }

    fn record(prompt_type: &str, validity: Option<f64>, steps: usize) -> OutputRecord {
        OutputRecord {
            prompt_type: prompt_type.into(),
            prompt_input_type: InputTag::Text,
            problem_number: 1,
            iteration: 1,
            solution_level_validity_score: validity,
            solution_level_redundancy_score: validity.map(|v| 1.0 - v),
            step_level_validity_scores: vec![0.5; steps],
            step_level_redundancy_scores: vec![0.1; steps],
        }
    }

    #[test]
    fn accuracy_per_category_and_overall() {
        let report = compute_accuracy(&[
            outcome("A", true),
            outcome("A", false),
            outcome("B", true),
        ]);

        let a = report.category("A").unwrap();
        assert_eq!((a.correct, a.total), (1, 2));
        assert!((a.accuracy().unwrap() - 0.5).abs() < f64::EPSILON);

        let b = report.category("B").unwrap();
        assert_eq!((b.correct, b.total), (1, 1));

        let overall = report.overall.as_ref().unwrap();
        assert_eq!((overall.correct, overall.total), (2, 3));

        let text = report.render_text();
        assert!(text.contains("A: 1/2 = 50.0%"));
        assert!(text.contains("B: 1/1 = 100.0%"));
        assert!(text.contains("OVERALL: 2/3 = 66.7%"));
    }

    #[test]
    fn empty_input_has_no_ratios() {
        let report = compute_accuracy(&[]);
        assert!(report.per_category.is_empty());
        assert!(report.overall.is_none());
        assert_eq!(report.render_text(), "=== Accuracy Metrics ===\n");
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let report = compute_accuracy(&[
            outcome("Persona", true),
            outcome("SCoT", false),
            outcome("Persona", false),
        ]);
        let names: Vec<&str> = report
            .per_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["Persona", "SCoT"]);
    }

    #[test]
    fn empty_category_has_no_accuracy() {
        let c = CategoryAccuracy {
            category: "X".into(),
            correct: 0,
            total: 0,
        };
        assert_eq!(c.accuracy(), None);
        assert_eq!(c.line(), None);
    }

    #[test]
    fn outcome_from_record_uses_threshold() {
        assert!(Outcome::from_record(&record("A", Some(0.5), 1), 0.5).correct);
        assert!(!Outcome::from_record(&record("A", Some(0.49), 1), 0.5).correct);
        assert!(!Outcome::from_record(&record("A", None, 1), 0.0).correct);
    }

    #[test]
    fn load_outcomes_mixes_explicit_and_scored_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval_results.json");
        let scored = serde_json::to_string(&record("SCoT", Some(0.9), 2)).unwrap();
        std::fs::write(
            &path,
            format!("{{\"type\": \"A\", \"correct\": false}}\n{scored}\n"),
        )
        .unwrap();

        let outcomes = load_outcomes(&path, 0.5).unwrap();
        assert_eq!(outcomes, vec![outcome("A", false), outcome("SCoT", true)]);

        let missing = load_outcomes(&dir.path().join("nope.json"), 0.5).unwrap();
        assert!(missing.is_empty());

        let records = load_scored_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prompt_type, "SCoT");
    }

    #[test]
    fn score_summary_skips_absent_scores() {
        let summary = compute_score_summary(&[
            record("SCoT", Some(0.8), 2),
            record("SCoT", None, 4),
            record("Persona", None, 0),
        ]);
        assert_eq!(summary.len(), 2);

        let scot = &summary[0];
        assert_eq!(scot.category, "SCoT");
        assert_eq!(scot.records, 2);
        assert!((scot.mean_solution_validity.unwrap() - 0.8).abs() < 1e-12);
        assert!((scot.mean_solution_redundancy.unwrap() - 0.2).abs() < 1e-12);
        assert!((scot.mean_step_count - 3.0).abs() < f64::EPSILON);

        let persona = &summary[1];
        assert_eq!(persona.mean_solution_validity, None);
        assert_eq!(persona.mean_step_count, 0.0);
    }
}
