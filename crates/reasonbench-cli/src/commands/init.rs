//! The `reasonbench init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    for (name, content) in [
        ("reasonbench.toml", SAMPLE_CONFIG),
        ("problems.json", SAMPLE_PROBLEMS),
    ] {
        if Path::new(name).exists() {
            println!("{name} already exists, skipping.");
        } else {
            std::fs::write(name, content)?;
            println!("Created {name}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Export OPENAI_API_KEY or edit reasonbench.toml");
    println!("  2. Run: reasonbench validate");
    println!("  3. Run: reasonbench generate --test-mode");
    println!("  4. Run: reasonbench generate");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# reasonbench configuration

default_provider = "openai"
default_model = "gpt-4.1"
temperature = 0.3

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.offline]
type = "mock"

# External reasoning evaluator, invoked once per response as
#   program args.. --model_name_or_path M --model_size S --question Q --steps_file F
[scorer]
program = "python"
args = ["eval_reasoning.py"]
model_name_or_path = "GAIR/ReasonEval-7B"
model_size = "7B"
timeout_secs = 600
"#;

const SAMPLE_PROBLEMS: &str = r#"[
  {
    "type": "SCoT",
    "content": "Compute the determinant of the matrix A = [[2, 1], [4, 3]]."
  },
  {
    "type": "Chain-of-Table",
    "content": "Solve the system x + 2y = 5, 3x - y = 1 by row reduction."
  },
  {
    "type": "LogiCoT",
    "content": "Are the vectors (1, 2, 3), (4, 5, 6), (7, 8, 9) linearly independent?"
  },
  {
    "type": "Persona",
    "content": "Find the eigenvalues of the matrix [[4, 1], [2, 3]].",
    "prompt_tailoring": "Explain each step as you would to a first-year student."
  }
]
"#;
