//! Response file naming.
//!
//! Every problem instance maps to `{type}_{tag}_{NN}_{II}.txt`, where `NN` is
//! a counter scoped to the `(type, tag)` pair and `II` the repetition. The
//! mapping is a pure function of the ordered problem list, so the generation
//! and evaluation passes derive identical names without sharing an index
//! file. Reordering, inserting, or deleting problems between the two passes
//! shifts the counters and the names no longer line up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{InputTag, ProblemSpec};

/// Identifies one stored response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseKey {
    pub prompt_type: String,
    pub input_tag: InputTag,
    pub problem_number: u32,
    pub iteration: u32,
}

impl ResponseKey {
    /// Filename without extension, e.g. `Persona_text_01_01`.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{:02}_{:02}",
            self.prompt_type, self.input_tag, self.problem_number, self.iteration
        )
    }

    /// Filename of the response text file.
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.file_stem())
    }

    /// Full path of the response inside `dir`.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Per-`(type, tag)` counters for a single pass.
#[derive(Debug, Default)]
pub struct NamingIndex {
    counters: HashMap<(String, InputTag), u32>,
}

impl NamingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next problem number for the pair, starting at 1.
    pub fn next(&mut self, prompt_type: &str, input_tag: InputTag) -> u32 {
        let counter = self
            .counters
            .entry((prompt_type.to_string(), input_tag))
            .or_insert(1);
        let current = *counter;
        *counter += 1;
        current
    }
}

/// The problem number assigned to one entry of the problem list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Position in the problem list.
    pub index: usize,
    pub prompt_type: String,
    pub input_tag: InputTag,
    pub problem_number: u32,
}

impl Assignment {
    /// Keys for iterations `1..=repeats`, all sharing this problem number.
    pub fn keys(&self, repeats: u32) -> impl Iterator<Item = ResponseKey> + '_ {
        (1..=repeats).map(move |iteration| self.key(iteration))
    }

    pub fn key(&self, iteration: u32) -> ResponseKey {
        ResponseKey {
            prompt_type: self.prompt_type.clone(),
            input_tag: self.input_tag,
            problem_number: self.problem_number,
            iteration,
        }
    }
}

/// Assign problem numbers to the list in order, using a fresh index.
pub fn assign_problem_numbers(problems: &[ProblemSpec]) -> Vec<Assignment> {
    let mut index = NamingIndex::new();
    problems
        .iter()
        .enumerate()
        .map(|(i, problem)| {
            let input_tag = problem.input_tag();
            Assignment {
                index: i,
                prompt_type: problem.prompt_type.clone(),
                input_tag,
                problem_number: index.next(&problem.prompt_type, input_tag),
            }
        })
        .collect()
}
