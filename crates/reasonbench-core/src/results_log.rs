//! Newline-delimited JSON results log and per-batch summaries.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::OutputRecord;

/// Default file name of the results log.
pub const DEFAULT_RESULTS_LOG: &str = "eval_results.json";

/// Append-only log holding one [`OutputRecord`] per line.
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record as a single JSON line.
    pub fn append(&self, record: &OutputRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).context("failed to serialize record")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open results log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        Ok(())
    }

    /// Empty the log, creating it if needed.
    pub fn truncate(&self) -> Result<()> {
        std::fs::write(&self.path, "")
            .with_context(|| format!("failed to clear results log {}", self.path.display()))
    }

    /// Read every record in the log. A missing log reads as empty.
    pub fn read_all(&self) -> Result<Vec<OutputRecord>> {
        read_json_lines(&self.path)
    }
}

/// Read a JSON-lines file, skipping blank lines. A missing file reads as empty.
pub fn read_json_lines<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("invalid JSON on line {} of {}", i + 1, path.display()))
        })
        .collect()
}

/// Write the collected records of one batch as a pretty JSON array.
pub fn write_batch_summary(path: &Path, records: &[OutputRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("failed to serialize summary")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    Ok(())
}

/// Load a batch summary written by [`write_batch_summary`].
pub fn load_batch_summary(path: &Path) -> Result<Vec<OutputRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read summary from {}", path.display()))?;
    serde_json::from_str(&content).context("failed to parse summary JSON")
}
