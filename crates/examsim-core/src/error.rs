//! Exam error types.
//!
//! Load and validation errors are fatal to starting a session but never to the
//! shell hosting it. Selection and transition errors are guards: the session
//! rejects the operation and its state stays exactly as it was.

use thiserror::Error;

use crate::model::Phase;

/// Errors produced while loading questions or driving a session.
#[derive(Debug, Error)]
pub enum ExamError {
    /// The question source could not be read or is not a question list.
    #[error("failed to load questions from {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    /// A question record violates a structural constraint.
    #[error("question {index} is invalid: {reason}")]
    Validation { index: usize, reason: String },

    /// The loaded question set contains no questions.
    #[error("question set is empty")]
    EmptyQuestionSet,

    /// A selection references an out-of-range question or option.
    #[error("invalid selection: option {option} for question {position}")]
    InvalidSelection { position: usize, option: usize },

    /// The operation is not allowed in the current phase.
    #[error("cannot {operation} while the exam is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ExamError {
    /// Returns `true` if this error prevents a session from starting.
    ///
    /// Fatal errors are surfaced to the user with an offer to retry; the
    /// others only reject a single command.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExamError::Load { .. } | ExamError::Validation { .. } | ExamError::EmptyQuestionSet
        )
    }

    pub(crate) fn load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        ExamError::Load {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(ExamError::EmptyQuestionSet.is_fatal());
        assert!(ExamError::load("questions.json", "not found").is_fatal());
        assert!(ExamError::Validation {
            index: 0,
            reason: "x".into()
        }
        .is_fatal());
        assert!(!ExamError::InvalidSelection {
            position: 1,
            option: 9
        }
        .is_fatal());
        assert!(!ExamError::InvalidTransition {
            operation: "submit",
            phase: Phase::NotStarted
        }
        .is_fatal());
    }

    #[test]
    fn transition_message_names_phase() {
        let err = ExamError::InvalidTransition {
            operation: "select an answer",
            phase: Phase::Finished,
        };
        assert_eq!(
            err.to_string(),
            "cannot select an answer while the exam is finished"
        );
    }
}
