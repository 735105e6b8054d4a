//! Exam session state machine.
//!
//! A `Session` owns everything mutable about one attempt: the shuffled
//! question order, recorded answers, the current position, the countdown,
//! and the phase. Phases only move forward
//! (`NotStarted -> InProgress -> Finished`) until `restart` puts the session
//! back to `NotStarted` with a fresh order.
//!
//! Every operation either succeeds or returns an error with the session left
//! exactly as it was.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ExamConfig;
use crate::error::ExamError;
use crate::model::{Direction, Phase, Question, QuestionStore};
use crate::review::{build_review, ReviewItem};
use crate::scoring::{compute_score, Answers, ScoreResult, TierPolicy};
use crate::shuffle::shuffle;
use crate::timer::{Countdown, TickOutcome, TimeDisplay};

/// Which navigation controls apply at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub can_go_previous: bool,
    pub can_go_next: bool,
    /// Submission is offered on the last question.
    pub is_last: bool,
}

/// What the presentation layer needs to draw the current question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView<'a> {
    pub position: usize,
    pub total: usize,
    pub question: &'a Question,
    /// Pending selection if any, otherwise the recorded answer.
    pub selected: Option<usize>,
    pub navigation: NavigationState,
}

/// Result of forwarding a timer tick to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickReport {
    /// The session is not in progress; nothing changed.
    Idle,
    Running(TimeDisplay),
    /// Time ran out on this tick and the exam was submitted.
    Expired {
        display: TimeDisplay,
        score: ScoreResult,
    },
}

pub struct Session {
    store: QuestionStore,
    order: Vec<Question>,
    answers: Answers,
    pending: Option<usize>,
    current: usize,
    phase: Phase,
    countdown: Countdown,
    tiers: TierPolicy,
    shuffle: bool,
    rng: StdRng,
    score: Option<ScoreResult>,
}

impl Session {
    /// Create a session over `store` and arrange its first question order.
    pub fn new(store: QuestionStore, config: &ExamConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut session = Self {
            store,
            order: Vec::new(),
            answers: Answers::new(),
            pending: None,
            current: 0,
            phase: Phase::NotStarted,
            countdown: Countdown::new(config.duration_secs),
            tiers: config.tiers,
            shuffle: config.shuffle,
            rng,
            score: None,
        };
        session.arrange();
        session
    }

    fn arrange(&mut self) {
        self.order = self.store.questions().to_vec();
        if self.shuffle {
            shuffle(&mut self.order, &mut self.rng);
        }
    }

    fn require(&self, phase: Phase, operation: &'static str) -> Result<(), ExamError> {
        if self.phase == phase {
            Ok(())
        } else {
            tracing::warn!(operation, phase = %self.phase, "rejected operation");
            Err(ExamError::InvalidTransition {
                operation,
                phase: self.phase,
            })
        }
    }

    /// Begin the attempt: position 0, full countdown, timer running.
    pub fn start(&mut self) -> Result<(), ExamError> {
        self.require(Phase::NotStarted, "start")?;
        if self.order.is_empty() {
            tracing::warn!("refusing to start with no questions");
            return Err(ExamError::EmptyQuestionSet);
        }

        self.current = 0;
        self.countdown.reset();
        self.countdown.start();
        self.phase = Phase::InProgress;

        tracing::debug!(
            questions = self.order.len(),
            duration_secs = self.countdown.duration_secs(),
            "exam started"
        );
        Ok(())
    }

    /// Record (or overwrite) the answer at `position`.
    ///
    /// Does not move the current position.
    pub fn select_answer(&mut self, position: usize, option: usize) -> Result<(), ExamError> {
        self.require(Phase::InProgress, "select an answer")?;

        let valid = self
            .order
            .get(position)
            .is_some_and(|q| q.has_option(option));
        if !valid {
            tracing::warn!(position, option, "rejected selection");
            return Err(ExamError::InvalidSelection { position, option });
        }

        self.answers.insert(position, option);
        if position == self.current {
            self.pending = None;
        }
        Ok(())
    }

    /// Mark `option` as chosen on the current question without recording it.
    ///
    /// The choice is committed by the next `go_to` or `submit`.
    pub fn stage_selection(&mut self, option: usize) -> Result<(), ExamError> {
        self.require(Phase::InProgress, "select an answer")?;

        if !self.order[self.current].has_option(option) {
            tracing::warn!(position = self.current, option, "rejected selection");
            return Err(ExamError::InvalidSelection {
                position: self.current,
                option,
            });
        }

        self.pending = Some(option);
        Ok(())
    }

    fn commit_pending(&mut self) {
        if let Some(option) = self.pending.take() {
            self.answers.insert(self.current, option);
        }
    }

    /// Move one question back or forward, returning the new position.
    ///
    /// Moving past either end leaves the position where it is.
    pub fn go_to(&mut self, direction: Direction) -> Result<usize, ExamError> {
        self.require(Phase::InProgress, "navigate")?;
        self.commit_pending();

        let last = self.order.len() - 1;
        self.current = match direction {
            Direction::Previous => self.current.saturating_sub(1),
            Direction::Next => (self.current + 1).min(last),
        };
        Ok(self.current)
    }

    /// Finish the attempt and return its score.
    ///
    /// Calling it again once finished returns the same score without
    /// recomputing it.
    pub fn submit(&mut self) -> Result<ScoreResult, ExamError> {
        if let (Phase::Finished, Some(score)) = (self.phase, self.score) {
            return Ok(score);
        }
        self.require(Phase::InProgress, "submit")?;
        self.commit_pending();
        Ok(self.finish())
    }

    fn finish(&mut self) -> ScoreResult {
        self.countdown.stop();
        self.phase = Phase::Finished;
        let score = compute_score(&self.order, &self.answers, &self.tiers);
        self.score = Some(score);

        tracing::info!(
            correct = score.correct_count,
            total = score.total_count,
            percentage = score.percentage,
            tier = %score.tier,
            "exam finished"
        );
        score
    }

    /// Advance the countdown by one second, submitting on expiry.
    pub fn tick(&mut self) -> TickReport {
        if self.phase != Phase::InProgress {
            return TickReport::Idle;
        }

        match self.countdown.tick() {
            TickOutcome::Idle => TickReport::Idle,
            TickOutcome::Running(display) => TickReport::Running(display),
            TickOutcome::Expired(display) => {
                tracing::info!("time expired, submitting");
                self.commit_pending();
                let score = self.finish();
                TickReport::Expired { display, score }
            }
        }
    }

    /// Discard the attempt and reshuffle; the caller starts the next one.
    pub fn restart(&mut self) {
        self.countdown.reset();
        self.answers.clear();
        self.pending = None;
        self.current = 0;
        self.score = None;
        self.phase = Phase::NotStarted;
        self.arrange();
        tracing::debug!("session restarted");
    }

    /// Like `restart`, but over a freshly loaded question set.
    pub fn restart_with(&mut self, store: QuestionStore) {
        self.store = store;
        self.restart();
    }

    /// Per-question review of a finished attempt.
    pub fn request_review(&self) -> Result<Vec<ReviewItem>, ExamError> {
        self.require(Phase::Finished, "review answers")?;
        Ok(build_review(&self.order, &self.answers))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn order(&self) -> &[Question] {
        &self.order
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answer(&self, position: usize) -> Option<usize> {
        self.answers.get(&position).copied()
    }

    pub fn pending_selection(&self) -> Option<usize> {
        self.pending
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.countdown.remaining_secs()
    }

    pub fn duration_seconds(&self) -> u64 {
        self.countdown.duration_secs()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.countdown.elapsed_secs()
    }

    pub fn time_display(&self) -> TimeDisplay {
        self.countdown.display()
    }

    pub fn is_timer_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// The score, once finished.
    pub fn score(&self) -> Option<ScoreResult> {
        self.score
    }

    /// Fraction of the exam before the current question (`position / total`).
    pub fn progress(&self) -> f64 {
        if self.order.is_empty() {
            0.0
        } else {
            self.current as f64 / self.order.len() as f64
        }
    }

    pub fn navigation(&self) -> NavigationState {
        let last = self.order.len().saturating_sub(1);
        NavigationState {
            can_go_previous: self.current > 0,
            can_go_next: self.current < last,
            is_last: self.current == last,
        }
    }

    /// The current question, while the exam is in progress.
    pub fn current_view(&self) -> Option<QuestionView<'_>> {
        if self.phase != Phase::InProgress {
            return None;
        }
        let question = self.order.get(self.current)?;
        Some(QuestionView {
            position: self.current,
            total: self.order.len(),
            question,
            selected: self.pending.or_else(|| self.answer(self.current)),
            navigation: self.navigation(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_question;

    fn store(n: usize) -> QuestionStore {
        QuestionStore::new(
            (0..n)
                .map(|i| sample_question(&format!("q{i}"), 4, i % 4))
                .collect(),
        )
        .unwrap()
    }

    fn config(duration_secs: u64) -> ExamConfig {
        ExamConfig {
            duration_secs,
            seed: Some(99),
            shuffle: false,
            ..Default::default()
        }
    }

    fn started(n: usize) -> Session {
        let mut s = Session::new(store(n), &config(600));
        s.start().unwrap();
        s
    }

    #[test]
    fn start_enters_in_progress() {
        let s = started(3);
        assert_eq!(s.phase(), Phase::InProgress);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_seconds(), 600);
        assert!(s.is_timer_running());
    }

    #[test]
    fn default_duration_is_four_hours() {
        let mut s = Session::new(store(1), &ExamConfig::default());
        s.start().unwrap();
        assert_eq!(s.remaining_seconds(), 14_400);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut s = started(2);
        let err = s.start().unwrap_err();
        assert!(matches!(err, ExamError::InvalidTransition { .. }));
        assert_eq!(s.phase(), Phase::InProgress);
    }

    #[test]
    fn start_with_no_questions_fails() {
        let mut s = Session::new(QuestionStore::default(), &config(60));
        assert!(matches!(s.start(), Err(ExamError::EmptyQuestionSet)));
        assert_eq!(s.phase(), Phase::NotStarted);
        assert!(!s.is_timer_running());
    }

    #[test]
    fn select_before_start_is_transition_error() {
        let mut s = Session::new(store(2), &config(60));
        let err = s.select_answer(0, 0).unwrap_err();
        assert!(matches!(err, ExamError::InvalidTransition { .. }));
        assert!(s.answers().is_empty());
    }

    #[test]
    fn invalid_selection_leaves_state_unchanged() {
        let mut s = started(2);
        s.select_answer(1, 2).unwrap();

        assert!(matches!(
            s.select_answer(2, 0),
            Err(ExamError::InvalidSelection { position: 2, .. })
        ));
        assert!(matches!(
            s.select_answer(1, 4),
            Err(ExamError::InvalidSelection { option: 4, .. })
        ));
        assert!(s.stage_selection(9).is_err());

        assert_eq!(s.answers(), &Answers::from([(1, 2)]));
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.pending_selection(), None);
    }

    #[test]
    fn select_does_not_advance() {
        let mut s = started(3);
        s.select_answer(0, 1).unwrap();
        s.select_answer(0, 3).unwrap();
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.answer(0), Some(3));
    }

    #[test]
    fn navigation_is_clamped() {
        let mut s = started(3);
        assert_eq!(s.go_to(Direction::Previous).unwrap(), 0);
        let moves = [
            Direction::Next,
            Direction::Next,
            Direction::Next,
            Direction::Next,
            Direction::Previous,
            Direction::Next,
            Direction::Next,
        ];
        for d in moves {
            let idx = s.go_to(d).unwrap();
            assert!(idx < 3);
        }
        assert_eq!(s.current_index(), 2);
        assert!(s.navigation().is_last);
        assert!(!s.navigation().can_go_next);
    }

    #[test]
    fn navigation_on_single_question() {
        let mut s = started(1);
        assert_eq!(s.go_to(Direction::Next).unwrap(), 0);
        assert_eq!(s.go_to(Direction::Previous).unwrap(), 0);
        let nav = s.navigation();
        assert!(!nav.can_go_previous && !nav.can_go_next && nav.is_last);
    }

    #[test]
    fn answers_survive_navigation() {
        let mut s = started(3);
        s.go_to(Direction::Next).unwrap();
        s.select_answer(1, 2).unwrap();
        s.go_to(Direction::Next).unwrap();
        s.go_to(Direction::Previous).unwrap();
        assert_eq!(s.answer(1), Some(2));
        assert_eq!(s.current_view().unwrap().selected, Some(2));
    }

    #[test]
    fn staged_selection_committed_on_navigate() {
        let mut s = started(2);
        s.stage_selection(3).unwrap();
        assert_eq!(s.answer(0), None);
        assert_eq!(s.current_view().unwrap().selected, Some(3));

        s.go_to(Direction::Next).unwrap();
        assert_eq!(s.answer(0), Some(3));
        assert_eq!(s.pending_selection(), None);
    }

    #[test]
    fn staged_selection_committed_on_submit() {
        let mut s = started(2);
        s.go_to(Direction::Next).unwrap();
        s.stage_selection(1).unwrap();
        let score = s.submit().unwrap();
        assert_eq!(s.answer(1), Some(1));
        assert_eq!(score.correct_count, 1);
    }

    #[test]
    fn submit_is_idempotent() {
        let mut s = started(2);
        s.select_answer(0, 0).unwrap();
        let first = s.submit().unwrap();
        let second = s.submit().unwrap();
        assert_eq!(first, second);
        assert_eq!(s.phase(), Phase::Finished);
        assert!(!s.is_timer_running());
    }

    #[test]
    fn submit_before_start_is_rejected() {
        let mut s = Session::new(store(2), &config(60));
        assert!(matches!(
            s.submit(),
            Err(ExamError::InvalidTransition { .. })
        ));
        assert_eq!(s.phase(), Phase::NotStarted);
    }

    #[test]
    fn finished_rejects_mutation() {
        let mut s = started(2);
        s.submit().unwrap();
        assert!(s.select_answer(0, 0).is_err());
        assert!(s.go_to(Direction::Next).is_err());
        assert!(s.start().is_err());
        assert!(s.answers().is_empty());
        assert!(s.current_view().is_none());
    }

    #[test]
    fn timer_expiry_submits() {
        let mut s = Session::new(store(2), &config(2));
        s.start().unwrap();
        s.select_answer(0, 0).unwrap();

        assert!(matches!(s.tick(), TickReport::Running(_)));
        assert!(matches!(s.tick(), TickReport::Expired { .. }));
        assert_eq!(s.tick(), TickReport::Idle);
        assert_eq!(s.remaining_seconds(), 0);
        assert_eq!(s.phase(), Phase::Finished);

        assert_eq!(s.tick(), TickReport::Idle);
        assert_eq!(s.remaining_seconds(), 0);
        assert_eq!(s.score().unwrap().correct_count, 1);
    }

    #[test]
    fn expiry_score_matches_later_submit() {
        let mut s = Session::new(store(2), &config(1));
        s.start().unwrap();
        let TickReport::Expired { score, .. } = s.tick() else {
            panic!("expected expiry");
        };
        assert_eq!(s.submit().unwrap(), score);
    }

    #[test]
    fn no_ticks_after_submit() {
        let mut s = started(2);
        s.tick();
        s.submit().unwrap();
        let remaining = s.remaining_seconds();
        for _ in 0..5 {
            assert_eq!(s.tick(), TickReport::Idle);
        }
        assert_eq!(s.remaining_seconds(), remaining);
    }

    #[test]
    fn tick_before_start_is_idle() {
        let mut s = Session::new(store(2), &config(5));
        assert_eq!(s.tick(), TickReport::Idle);
        assert_eq!(s.remaining_seconds(), 5);
    }

    #[test]
    fn restart_resets_everything() {
        let mut s = started(4);
        s.select_answer(0, 1).unwrap();
        s.go_to(Direction::Next).unwrap();
        s.stage_selection(2).unwrap();
        s.tick();
        s.submit().unwrap();

        s.restart();
        assert_eq!(s.phase(), Phase::NotStarted);
        assert!(s.answers().is_empty());
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_seconds(), 600);
        assert!(s.score().is_none());
        assert_eq!(s.pending_selection(), None);
        assert!(!s.is_timer_running());

        s.start().unwrap();
        assert_eq!(s.phase(), Phase::InProgress);
    }

    #[test]
    fn restart_from_in_progress_stops_timer() {
        let mut s = started(2);
        s.restart();
        assert_eq!(s.tick(), TickReport::Idle);
        assert_eq!(s.remaining_seconds(), 600);
    }

    #[test]
    fn restart_with_replaces_question_set() {
        let mut s = started(2);
        s.select_answer(0, 0).unwrap();
        s.restart_with(store(5));
        assert_eq!(s.phase(), Phase::NotStarted);
        assert_eq!(s.order().len(), 5);
        assert_eq!(s.answered_count(), 0);

        s.start().unwrap();
        s.select_answer(4, 0).unwrap();
        assert_eq!(s.answered_count(), 1);
    }

    #[test]
    fn restart_reshuffles_order() {
        let cfg = ExamConfig {
            seed: Some(5),
            shuffle: true,
            ..config(60)
        };
        let mut s = Session::new(store(12), &cfg);
        let first: Vec<String> = s.order().iter().map(|q| q.question.clone()).collect();

        let mut changed = false;
        for _ in 0..5 {
            s.restart();
            let next: Vec<String> = s.order().iter().map(|q| q.question.clone()).collect();
            let mut sorted = next.clone();
            sorted.sort();
            let mut expected = first.clone();
            expected.sort();
            assert_eq!(sorted, expected);
            changed |= next != first;
        }
        assert!(changed);
    }

    #[test]
    fn seeded_sessions_share_order() {
        let cfg = ExamConfig {
            seed: Some(1234),
            shuffle: true,
            ..config(60)
        };
        let a = Session::new(store(10), &cfg);
        let b = Session::new(store(10), &cfg);
        assert_eq!(a.order(), b.order());
    }

    #[test]
    fn review_requires_finished() {
        let mut s = started(2);
        assert!(matches!(
            s.request_review(),
            Err(ExamError::InvalidTransition { .. })
        ));
        s.select_answer(1, 1).unwrap();
        s.submit().unwrap();

        let review = s.request_review().unwrap();
        assert_eq!(review.len(), 2);
        assert!(review[0].unanswered);
        assert!(review[1].is_correct);
        assert_eq!(review, s.request_review().unwrap());
    }

    #[test]
    fn progress_fraction() {
        let mut s = started(4);
        assert_eq!(s.progress(), 0.0);
        s.go_to(Direction::Next).unwrap();
        s.go_to(Direction::Next).unwrap();
        assert!((s.progress() - 0.5).abs() < f64::EPSILON);
    }
}
