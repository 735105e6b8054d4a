//! Attempt scoring and feedback tiers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::Question;

/// Recorded answers: question position to selected option index.
pub type Answers = BTreeMap<usize, usize>;

/// Qualitative feedback bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackTier {
    NeedsImprovement,
    Good,
    Excellent,
}

impl FeedbackTier {
    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent! You are well prepared for the real exam.",
            FeedbackTier::Good => "Good attempt. Keep revising to improve your score.",
            FeedbackTier::NeedsImprovement => {
                "You need more revision. Focus on the key concepts."
            }
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "excellent",
            FeedbackTier::Good => "good",
            FeedbackTier::NeedsImprovement => "needs-improvement",
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

/// Percentage cutoffs for each feedback tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Minimum percentage for `Excellent`.
    #[serde(default = "default_excellent")]
    pub excellent_at: f64,
    /// Minimum percentage for `Good`.
    #[serde(default = "default_good")]
    pub good_at: f64,
}

fn default_excellent() -> f64 {
    70.0
}

fn default_good() -> f64 {
    50.0
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            excellent_at: default_excellent(),
            good_at: default_good(),
        }
    }
}

impl TierPolicy {
    /// Build a policy, checking that cutoffs are ordered and within 0..=100.
    pub fn new(excellent_at: f64, good_at: f64) -> Result<Self, ExamError> {
        let policy = Self {
            excellent_at,
            good_at,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ExamError> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.excellent_at) || !in_range(self.good_at) {
            return Err(ExamError::Config(format!(
                "tier cutoffs must be within 0..=100 (excellent_at = {}, good_at = {})",
                self.excellent_at, self.good_at
            )));
        }
        if self.good_at > self.excellent_at {
            return Err(ExamError::Config(format!(
                "good_at ({}) must not exceed excellent_at ({})",
                self.good_at, self.excellent_at
            )));
        }
        Ok(())
    }

    pub fn tier_for(&self, percentage: f64) -> FeedbackTier {
        if percentage >= self.excellent_at {
            FeedbackTier::Excellent
        } else if percentage >= self.good_at {
            FeedbackTier::Good
        } else {
            FeedbackTier::NeedsImprovement
        }
    }
}

/// Outcome of scoring an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub correct_count: usize,
    pub total_count: usize,
    pub percentage: f64,
    pub tier: FeedbackTier,
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} ({:.0}%)",
            self.correct_count, self.total_count, self.percentage
        )
    }
}

/// Score `answers` against `order`.
///
/// Unanswered positions count as incorrect. An empty `order` scores 0%;
/// sessions refuse to start with no questions, so this only happens when
/// called directly.
pub fn compute_score(order: &[Question], answers: &Answers, policy: &TierPolicy) -> ScoreResult {
    let correct_count = order
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i) == Some(&q.correct))
        .count();
    let total_count = order.len();

    let percentage = if total_count == 0 {
        0.0
    } else {
        100.0 * correct_count as f64 / total_count as f64
    };

    ScoreResult {
        correct_count,
        total_count,
        percentage,
        tier: policy.tier_for(percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_question;

    #[test]
    fn half_correct() {
        let order = vec![sample_question("q0", 2, 1), sample_question("q1", 2, 0)];
        let answers = Answers::from([(0, 1), (1, 1)]);
        let score = compute_score(&order, &answers, &TierPolicy::default());
        assert_eq!(score.correct_count, 1);
        assert_eq!(score.total_count, 2);
        assert!((score.percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(score.tier, FeedbackTier::Good);
    }

    #[test]
    fn unanswered_counts_as_incorrect() {
        let order = vec![sample_question("q0", 3, 0), sample_question("q1", 3, 2)];
        let answers = Answers::from([(1, 2)]);
        let score = compute_score(&order, &answers, &TierPolicy::default());
        assert_eq!(score.correct_count, 1);
        assert_eq!(score.to_string(), "1 / 2 (50%)");
    }

    #[test]
    fn nothing_answered_is_zero() {
        let order = vec![sample_question("q0", 2, 0)];
        let score = compute_score(&order, &Answers::new(), &TierPolicy::default());
        assert_eq!(score.correct_count, 0);
        assert_eq!(score.tier, FeedbackTier::NeedsImprovement);
    }

    #[test]
    fn empty_order_does_not_divide_by_zero() {
        let score = compute_score(&[], &Answers::new(), &TierPolicy::default());
        assert_eq!(score.total_count, 0);
        assert_eq!(score.percentage, 0.0);
    }

    #[test]
    fn default_cutoffs() {
        let p = TierPolicy::default();
        assert_eq!(p.tier_for(100.0), FeedbackTier::Excellent);
        assert_eq!(p.tier_for(70.0), FeedbackTier::Excellent);
        assert_eq!(p.tier_for(69.9), FeedbackTier::Good);
        assert_eq!(p.tier_for(50.0), FeedbackTier::Good);
        assert_eq!(p.tier_for(49.9), FeedbackTier::NeedsImprovement);
        assert_eq!(p.tier_for(0.0), FeedbackTier::NeedsImprovement);
    }

    #[test]
    fn custom_cutoffs() {
        let p = TierPolicy::new(90.0, 70.0).unwrap();
        assert_eq!(p.tier_for(89.0), FeedbackTier::Good);
        assert_eq!(p.tier_for(69.0), FeedbackTier::NeedsImprovement);
    }

    #[test]
    fn tiers_are_monotonic() {
        for policy in [TierPolicy::default(), TierPolicy::new(90.0, 70.0).unwrap()] {
            let mut last = FeedbackTier::NeedsImprovement;
            for step in 0..=1000 {
                let tier = policy.tier_for(step as f64 / 10.0);
                assert!(tier >= last);
                last = tier;
            }
        }
    }

    #[test]
    fn invalid_policies_rejected() {
        assert!(TierPolicy::new(50.0, 70.0).is_err());
        assert!(TierPolicy::new(120.0, 50.0).is_err());
        assert!(TierPolicy::new(70.0, -1.0).is_err());
        assert!(TierPolicy::new(70.0, 70.0).is_ok());
    }

    #[test]
    fn tier_labels() {
        assert_eq!(FeedbackTier::NeedsImprovement.css_class(), "needs-improvement");
        assert!(FeedbackTier::Excellent.message().starts_with("Excellent"));
    }
}
