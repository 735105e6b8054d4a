//! The `examsim validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examsim_core::parser::{self, FileSource};

pub async fn execute(questions: PathBuf) -> Result<()> {
    let store = parser::load(&FileSource::new(questions.clone()))
        .await
        .with_context(|| format!("invalid question set {}", questions.display()))?;

    println!(
        "Question set: {} ({} questions)",
        questions.display(),
        store.len()
    );
    if store.is_empty() {
        println!("  WARNING: the set has no questions and cannot be used for an exam");
    }

    let warnings = parser::lint_questions(&store);
    for w in &warnings {
        let prefix = w
            .index
            .map(|i| format!("  [#{}]", i + 1))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() && !store.is_empty() {
        println!("All questions valid.");
    } else if !warnings.is_empty() {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
