//! Question source loading and validation.
//!
//! Fetching is the only asynchronous step of a session. Parsing and
//! validation are all-or-nothing: one bad record fails the whole load.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ExamError;
use crate::model::{Question, QuestionStore};

/// Serialized form of a question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionFormat {
    /// A top-level JSON array of question records.
    #[default]
    Json,
    /// A TOML document with a `[[questions]]` array.
    Toml,
}

impl QuestionFormat {
    /// Pick a format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => QuestionFormat::Toml,
            _ => QuestionFormat::Json,
        }
    }
}

/// Where questions come from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable name used in error messages.
    fn describe(&self) -> String;

    /// Format of the fetched text.
    fn format(&self) -> QuestionFormat;

    /// Fetch the raw question document.
    async fn fetch(&self) -> Result<String, ExamError>;
}

/// Questions stored in a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn format(&self) -> QuestionFormat {
        QuestionFormat::from_path(&self.path)
    }

    async fn fetch(&self) -> Result<String, ExamError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ExamError::load(self.describe(), e))
    }
}

/// Questions held in memory.
#[derive(Debug, Clone)]
pub struct InlineSource {
    name: String,
    content: String,
    format: QuestionFormat,
}

impl InlineSource {
    pub fn json(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            format: QuestionFormat::Json,
        }
    }

    pub fn toml(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            format: QuestionFormat::Toml,
        }
    }
}

#[async_trait]
impl QuestionSource for InlineSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn format(&self) -> QuestionFormat {
        self.format
    }

    async fn fetch(&self) -> Result<String, ExamError> {
        Ok(self.content.clone())
    }
}

/// A TOML question document. `questions` is required; `questions = []` is
/// the only way to spell an empty set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlQuestionFile {
    questions: Vec<Question>,
}

/// Fetch, parse, and validate a question set.
pub async fn load(source: &dyn QuestionSource) -> Result<QuestionStore, ExamError> {
    let name = source.describe();
    tracing::debug!(source = %name, "loading questions");

    let content = source.fetch().await?;
    let store = parse_questions_str(&content, source.format(), &name)?;

    tracing::debug!(source = %name, count = store.len(), "questions loaded");
    Ok(store)
}

/// Parse and validate a question document (useful for testing).
pub fn parse_questions_str(
    content: &str,
    format: QuestionFormat,
    source_name: &str,
) -> Result<QuestionStore, ExamError> {
    let questions: Vec<Question> = match format {
        QuestionFormat::Json => {
            serde_json::from_str(content).map_err(|e| ExamError::load(source_name, e))?
        }
        QuestionFormat::Toml => {
            toml::from_str::<TomlQuestionFile>(content)
                .map_err(|e| ExamError::load(source_name, e))?
                .questions
        }
    };

    QuestionStore::new(questions)
}

/// A non-fatal issue found in a question set.
#[derive(Debug, Clone)]
pub struct LintWarning {
    /// Position of the question in the source, if applicable.
    pub index: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Check a loaded question set for issues that do not block an exam.
pub fn lint_questions(store: &QuestionStore) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for (index, q) in store.iter().enumerate() {
        if !seen.insert(q.question.trim()) {
            warnings.push(LintWarning {
                index: Some(index),
                message: "duplicate question text".into(),
            });
        }
    }

    for (index, q) in store.iter().enumerate() {
        let mut options = HashSet::new();
        if q.options.iter().any(|o| !options.insert(o.trim())) {
            warnings.push(LintWarning {
                index: Some(index),
                message: "question has duplicate options".into(),
            });
        }
    }

    for (index, q) in store.iter().enumerate() {
        if q.explanation.trim().is_empty() {
            warnings.push(LintWarning {
                index: Some(index),
                message: "no explanation for review".into(),
            });
        }
    }

    warnings
}
