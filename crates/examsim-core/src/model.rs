//! Core data model types for examsim.
//!
//! Questions are immutable once loaded. A `QuestionStore` only ever holds
//! questions that passed validation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ExamError;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    pub question: String,
    /// Option texts, in display order.
    pub options: Vec<String>,
    /// Index of the correct option.
    pub correct: usize,
    /// Shown during review.
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// Check the structural constraints of this question.
    ///
    /// `index` is the record's position in the source and is only used to
    /// label the error.
    pub fn validate(&self, index: usize) -> Result<(), ExamError> {
        let fail = |reason: String| Err(ExamError::Validation { index, reason });

        if self.question.trim().is_empty() {
            return fail("question text is empty".into());
        }
        if self.options.len() < 2 {
            return fail(format!(
                "needs at least 2 options, found {}",
                self.options.len()
            ));
        }
        if self.correct >= self.options.len() {
            return fail(format!(
                "correct option {} is out of range for {} options",
                self.correct,
                self.options.len()
            ));
        }
        Ok(())
    }

    /// Returns `true` if `option` indexes one of this question's options.
    pub fn has_option(&self, option: usize) -> bool {
        option < self.options.len()
    }
}

/// The validated, immutable question set for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionStore {
    questions: Vec<Question>,
}

impl QuestionStore {
    /// Build a store, rejecting the whole set if any question is invalid.
    pub fn new(questions: Vec<Question>) -> Result<Self, ExamError> {
        for (index, q) in questions.iter().enumerate() {
            q.validate(index)?;
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

impl<'a> IntoIterator for &'a QuestionStore {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

/// Lifecycle phase of an exam session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not-started"),
            Phase::InProgress => write!(f, "in-progress"),
            Phase::Finished => write!(f, "finished"),
        }
    }
}

/// Navigation direction between questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Previous,
    Next,
}

#[cfg(test)]
pub(crate) fn sample_question(text: &str, options: usize, correct: usize) -> Question {
    Question {
        question: text.to_string(),
        options: (0..options).map(|i| format!("{text} option {i}")).collect(),
        correct,
        explanation: format!("{text} explanation"),
    }
}
