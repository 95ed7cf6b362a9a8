//! Core data model types for reasonbench.
//!
//! Problems are loaded once from a static JSON collection and stay immutable
//! for the whole run. Every scored response becomes one [`OutputRecord`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::PromptError;

/// A template family selecting how a problem is phrased to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptType {
    /// Structured chain-of-thought aligned with verification code.
    SCoT,
    /// Row operations presented as a chain of matrix tables.
    ChainOfTable,
    /// Step-by-step solving with a logical check after each step.
    LogiCoT,
    /// The model answers as a linear algebra professor.
    Persona,
}

impl PromptType {
    /// Every recognised prompt type, in template order.
    pub const ALL: [PromptType; 4] = [
        PromptType::SCoT,
        PromptType::ChainOfTable,
        PromptType::LogiCoT,
        PromptType::Persona,
    ];

    /// The name used in problem files and response filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::SCoT => "SCoT",
            PromptType::ChainOfTable => "Chain-of-Table",
            PromptType::LogiCoT => "LogiCoT",
            PromptType::Persona => "Persona",
        }
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptType {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PromptError::InvalidPromptType(s.to_string()))
    }
}

/// Whether a problem is text-only or comes with an image.
///
/// Parsed case-insensitively, both from files and from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputTag {
    Text,
    Image,
}

impl InputTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputTag::Text => "text",
            InputTag::Image => "image",
        }
    }
}

impl fmt::Display for InputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(InputTag::Text),
            "image" => Ok(InputTag::Image),
            other => Err(format!("unknown input tag: {other} (expected text or image)")),
        }
    }
}

impl<'de> Deserialize<'de> for InputTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Size of the reasoning-evaluator checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelSize {
    #[default]
    #[serde(rename = "7B")]
    Small,
    #[serde(rename = "34B")]
    Large,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Small => "7B",
            ModelSize::Large => "34B",
        }
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "7B" => Ok(ModelSize::Small),
            "34B" => Ok(ModelSize::Large),
            other => Err(format!("unknown model size: {other} (expected 7B or 34B)")),
        }
    }
}

/// A single problem definition from the problems file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSpec {
    /// Prompt type name. Kept as text so unknown types fail at render time.
    #[serde(rename = "type")]
    pub prompt_type: String,
    /// The problem statement substituted into the template.
    pub content: String,
    /// Image attached to the request, relative to the problems file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    /// Extra instructions appended after the rendered template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tailoring: Option<String>,
    /// Explicit modality; derived from `image` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_input_type: Option<InputTag>,
}

impl ProblemSpec {
    /// Create a text-only problem.
    pub fn text(prompt_type: &str, content: &str) -> Self {
        Self {
            prompt_type: prompt_type.to_string(),
            content: content.to_string(),
            image: None,
            prompt_tailoring: None,
            prompt_input_type: None,
        }
    }

    /// The modality used as part of the naming key.
    ///
    /// Both the generation and the evaluation pass call this, so a problem
    /// always lands under the same `(type, tag)` counter.
    pub fn input_tag(&self) -> InputTag {
        match (self.prompt_input_type, &self.image) {
            (Some(tag), _) => tag,
            (None, Some(_)) => InputTag::Image,
            (None, None) => InputTag::Text,
        }
    }
}

/// One scored response, as written to the results log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    #[serde(rename = "type")]
    pub prompt_type: String,
    pub prompt_input_type: InputTag,
    pub problem_number: u32,
    pub iteration: u32,
    pub solution_level_validity_score: Option<f64>,
    pub solution_level_redundancy_score: Option<f64>,
    #[serde(default)]
    pub step_level_validity_scores: Vec<f64>,
    #[serde(default)]
    pub step_level_redundancy_scores: Vec<f64>,
}
