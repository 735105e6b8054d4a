//! The `examsim init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("examsim.toml").exists() {
        println!("examsim.toml already exists, skipping.");
    } else {
        std::fs::write("examsim.toml", SAMPLE_CONFIG)?;
        println!("Created examsim.toml");
    }

    if Path::new("questions.json").exists() {
        println!("questions.json already exists, skipping.");
    } else {
        std::fs::write("questions.json", SAMPLE_QUESTIONS)?;
        println!("Created questions.json");
    }

    println!("\nNext steps:");
    println!("  1. Replace questions.json with your own question bank");
    println!("  2. Run: examsim validate --questions questions.json");
    println!("  3. Run: examsim run --questions questions.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examsim configuration

title = "Practice Exam"
# Four hours.
duration_secs = 14400
shuffle = true
# seed = 42

[tiers]
excellent_at = 70.0
good_at = 50.0
"#;

const SAMPLE_QUESTIONS: &str = r#"[
  {
    "question": "Which port does HTTPS use by default?",
    "options": ["21", "80", "443", "8080"],
    "correct": 2,
    "explanation": "HTTPS is served on port 443 unless configured otherwise."
  },
  {
    "question": "Which data structure gives O(1) average lookup by key?",
    "options": ["Linked list", "Hash map", "Binary heap"],
    "correct": 1,
    "explanation": "Hash maps hash the key straight to a bucket."
  },
  {
    "question": "What does DNS translate?",
    "options": ["Domain names to IP addresses", "MAC addresses to IP addresses"],
    "correct": 0,
    "explanation": "DNS resolves human-readable names to addresses."
  }
]
"#;
