//! The `reasonbench validate` command.

use std::path::PathBuf;

use anyhow::Result;

use reasonbench_core::naming::assign_problem_numbers;
use reasonbench_core::problems::{base_dir, load_problems, validate_problems};

pub fn execute(problems_path: PathBuf) -> Result<()> {
    let problems = load_problems(&problems_path)?;
    println!(
        "Problems: {} ({} problems)",
        problems_path.display(),
        problems.len()
    );

    for assignment in assign_problem_numbers(&problems) {
        println!("  [{}] {}", assignment.index, assignment.key(1).file_stem());
    }

    let warnings = validate_problems(&problems, base_dir(&problems_path));
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.index, w.message);
    }

    if warnings.is_empty() {
        println!("All problems valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
