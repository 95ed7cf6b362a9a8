//! Problem definition loading and validation.

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{InputTag, ProblemSpec, PromptType};

/// Default problems file name.
pub const DEFAULT_PROBLEMS_FILE: &str = "problems.json";

/// Load the problem list from a JSON array file.
pub fn load_problems(path: &Path) -> Result<Vec<ProblemSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read problems file: {}", path.display()))?;

    parse_problems_str(&content, path)
}

/// Parse a JSON string into a problem list (useful for testing).
pub fn parse_problems_str(content: &str, source_path: &Path) -> Result<Vec<ProblemSpec>> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse problems JSON: {}", source_path.display()))
}

/// Directory that relative image paths resolve against.
pub fn base_dir(problems_path: &Path) -> &Path {
    problems_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// A warning from problem list validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based position in the problem list.
    pub index: usize,
    /// Warning message.
    pub message: String,
}

/// Validate a problem list for common issues.
pub fn validate_problems(problems: &[ProblemSpec], base_dir: &Path) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |index: usize, message: String| {
        warnings.push(ValidationWarning { index, message });
    };

    for (i, problem) in problems.iter().enumerate() {
        if let Err(e) = problem.prompt_type.parse::<PromptType>() {
            warn(i, e.to_string());
        }

        if problem.content.trim().is_empty() {
            warn(i, "content is empty".into());
        }

        if let Some(image) = &problem.image {
            if !base_dir.join(image).is_file() {
                warn(i, format!("image not found: {}", image.display()));
            }
        }

        match (problem.prompt_input_type, &problem.image) {
            (Some(InputTag::Text), Some(_)) => warn(
                i,
                "image is set but prompt_input_type is \"text\"; responses are named as text".into(),
            ),
            (Some(InputTag::Image), None) => warn(
                i,
                "prompt_input_type is \"image\" but no image is attached".into(),
            ),
            _ => {}
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PROBLEMS: &str = r#"[
        {"type": "SCoT", "content": "Compute det([[1, 2], [3, 4]])."},
        {"type": "Persona", "content": "Is {v1, v2} linearly independent?", "prompt_tailoring": "Be brief."},
        {"type": "Chain-of-Table", "content": "Solve the following matrix problem:", "image": "images/m.png"}
    ]"#;

    #[test]
    fn parse_problem_list() {
        let problems = parse_problems_str(PROBLEMS, &PathBuf::from("problems.json")).unwrap();
        assert_eq!(problems.len(), 3);
        assert_eq!(problems[1].prompt_tailoring.as_deref(), Some("Be brief."));
        assert_eq!(problems[2].input_tag(), InputTag::Image);
    }

    #[test]
    fn parse_capitalised_input_type() {
        let problems = parse_problems_str(
            r#"[{"type": "SCoT", "content": "x", "prompt_input_type": "Image"}]"#,
            &PathBuf::from("p.json"),
        )
        .unwrap();
        assert_eq!(problems[0].input_tag(), InputTag::Image);
    }

    #[test]
    fn parse_malformed_json() {
        let result = parse_problems_str("{\"type\": ", &PathBuf::from("bad.json"));
        assert!(result.is_err());
    }

    #[test]
    fn load_missing_file() {
        let err = load_problems(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read problems file"));
    }

    #[test]
    fn validate_reports_issues() {
        let dir = tempfile::tempdir().unwrap();
        let problems = vec![
            ProblemSpec::text("SCoT", "ok"),
            ProblemSpec::text("Unknown", "ok"),
            ProblemSpec::text("Persona", "  "),
            ProblemSpec {
                image: Some(PathBuf::from("missing.png")),
                prompt_input_type: Some(InputTag::Text),
                ..ProblemSpec::text("LogiCoT", "see image")
            },
            ProblemSpec {
                prompt_input_type: Some(InputTag::Image),
                ..ProblemSpec::text("LogiCoT", "no image")
            },
        ];

        let warnings = validate_problems(&problems, dir.path());
        let at = |i: usize| -> Vec<&str> {
            warnings
                .iter()
                .filter(|w| w.index == i)
                .map(|w| w.message.as_str())
                .collect()
        };

        assert!(at(0).is_empty());
        assert!(at(1)[0].contains("invalid prompt type"));
        assert!(at(2)[0].contains("empty"));
        assert_eq!(at(3).len(), 2);
        assert!(at(4)[0].contains("no image"));
    }

    #[test]
    fn validate_resolves_images_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/m.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let problems = vec![ProblemSpec {
            image: Some(PathBuf::from("images/m.png")),
            ..ProblemSpec::text("Chain-of-Table", "matrix")
        }];
        assert!(validate_problems(&problems, dir.path()).is_empty());
    }

    #[test]
    fn base_dir_of_bare_file_name() {
        assert_eq!(base_dir(Path::new("problems.json")), Path::new("."));
        assert_eq!(base_dir(Path::new("data/problems.json")), Path::new("data"));
    }
}
