//! Exam report types with JSON export.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExamError;
use crate::review::ReviewItem;
use crate::scoring::ScoreResult;
use crate::session::Session;

/// A finished attempt with its score and full review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Exam title.
    pub title: String,
    pub score: ScoreResult,
    pub review: Vec<ReviewItem>,
    /// Seconds spent before submission or expiry.
    pub time_used_secs: u64,
    /// Configured exam length in seconds.
    pub duration_secs: u64,
}

impl ExamReport {
    /// Snapshot a finished session.
    pub fn from_session(session: &Session, title: impl Into<String>) -> Result<Self, ExamError> {
        let review = session.request_review()?;
        let score = session
            .score()
            .ok_or(ExamError::InvalidTransition {
                operation: "build a report",
                phase: session.phase(),
            })?;

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            title: title.into(),
            score,
            review,
            time_used_secs: session.elapsed_seconds(),
            duration_secs: session.duration_seconds(),
        })
    }

    /// Number of review entries with no recorded answer.
    pub fn unanswered_count(&self) -> usize {
        self.review.iter().filter(|r| r.unanswered).count()
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ExamReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
