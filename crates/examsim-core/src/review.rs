//! Post-exam answer review.

use serde::{Deserialize, Serialize};

use crate::model::Question;
use crate::scoring::Answers;

/// One option as shown in review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOption {
    pub text: String,
    pub is_correct_option: bool,
    /// The candidate picked this option and it is wrong.
    pub is_user_selected_incorrect_option: bool,
}

/// Review entry for one question position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub position: usize,
    pub question: String,
    pub options: Vec<ReviewOption>,
    pub explanation: String,
    pub selected: Option<usize>,
    pub unanswered: bool,
    pub is_correct: bool,
}

/// Build the review list for an attempt.
pub fn build_review(order: &[Question], answers: &Answers) -> Vec<ReviewItem> {
    order
        .iter()
        .enumerate()
        .map(|(position, q)| {
            let selected = answers.get(&position).copied();
            let options = q
                .options
                .iter()
                .enumerate()
                .map(|(i, text)| ReviewOption {
                    text: text.clone(),
                    is_correct_option: i == q.correct,
                    is_user_selected_incorrect_option: selected == Some(i) && i != q.correct,
                })
                .collect();

            ReviewItem {
                position,
                question: q.question.clone(),
                options,
                explanation: q.explanation.clone(),
                selected,
                unanswered: selected.is_none(),
                is_correct: selected == Some(q.correct),
            }
        })
        .collect()
}
