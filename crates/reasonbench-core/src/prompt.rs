//! Prompt templates and rendering.
//!
//! Each [`PromptType`] maps to an ordered list of fragments. Fragments are
//! joined with newlines and the problem text replaces the single
//! `{content}` placeholder.

use crate::error::PromptError;
use crate::model::PromptType;

/// Placeholder substituted with the problem content.
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Separator placed in front of non-empty tailoring text.
pub const TAILORING_PREFIX: &str = "\n\nAdditional Instructions: ";

// Template wording must stay byte-identical between runs, typos included.

const ONE_STEP_PER_LINE: [&str; 4] = [
    "Present the step-by-step explanation such that each step\u{2014}including both the description and the calculation\u{2014}is written in a single line without any line breaks between the steps.",
    "For example it should be: 1. Description and calculation. 2. Description and calculation.",
    "Ensure the final step or answer is also numbered and formatted in a single line.",
    "Maintain this format consistently so that each step occupies exactly one line.",
];

const SCOT: &[&str] = &[concat!(
    "Solve the linear algebra problem step-by-step, ensuring alignment with code logic.\n",
    "Problem: {content}\n",
    "First, outline the mathematical steps in natural language. ",
    "Then, generate executable Python code to verify the solution. ",
    "Make sure the answer you provide is in LaTex format and sutiable for a .tex document."
)];

const CHAIN_OF_TABLE: &[&str] = &[
    concat!(
        "Given an augmented matrix representing a system of linear equations, ",
        "perform step-by-step row operations and show each transformation as a chain of tables. ",
        "Each table should represent the matrix at a specific step, with the operation used labeled clearly between them. ",
        "When providing the answer, use plain text for explanations and LaTeX format for all mathematical notations."
    ),
    ONE_STEP_PER_LINE[0],
    ONE_STEP_PER_LINE[1],
    ONE_STEP_PER_LINE[2],
    concat!(
        "Maintain this format consistently so that each step occupies exactly one line.\n",
        "Problem: {content}"
    ),
];

const LOGICOT: &[&str] = &[
    concat!(
        "Solve the equation step-by-step.\n",
        "Problem: {content}\n",
        "After each step, verify its correctness using principles of linear algebra (e.g., properties of determinants, rank, or eigenvalues)."
    ),
    "If a step contains errors, revise it and proceed.",
    "When providing the answer, use plain text for explanations and LaTeX format for all mathematical notations.",
    ONE_STEP_PER_LINE[0],
    ONE_STEP_PER_LINE[1],
    ONE_STEP_PER_LINE[2],
    ONE_STEP_PER_LINE[3],
];

const PERSONA: &[&str] = &[
    concat!(
        "Imagine you are a linear algebra university professor. ",
        "A student provides you with a question, solve this question step-by-step with principles ",
        "of linear algebra validating your reasoning for each step and provide a final answer. ",
        "When providing the answer, use plain text for explanations and LaTeX format for all mathematical notationnotations."
    ),
    ONE_STEP_PER_LINE[0],
    ONE_STEP_PER_LINE[1],
    ONE_STEP_PER_LINE[2],
    concat!(
        "Maintain this format consistently so that each step occupies exactly one line.\n",
        "The question is: {content}"
    ),
];

/// The template fragments for a prompt type.
pub fn template(prompt_type: PromptType) -> &'static [&'static str] {
    match prompt_type {
        PromptType::SCoT => SCOT,
        PromptType::ChainOfTable => CHAIN_OF_TABLE,
        PromptType::LogiCoT => LOGICOT,
        PromptType::Persona => PERSONA,
    }
}

/// Render the final prompt for a problem.
///
/// Fails with [`PromptError::InvalidPromptType`] when `prompt_type` names no
/// template. Tailoring is appended only when it is non-empty after trimming.
pub fn render(
    prompt_type: &str,
    content: &str,
    tailoring: Option<&str>,
) -> Result<String, PromptError> {
    let prompt_type: PromptType = prompt_type.parse()?;
    let base = template(prompt_type)
        .join("\n")
        .replacen(CONTENT_PLACEHOLDER, content, 1);

    match tailoring {
        Some(extra) if !extra.trim().is_empty() => Ok(format!("{base}{TAILORING_PREFIX}{extra}")),
        _ => Ok(base),
    }
}
