//! Exam engine: drives a `Session` from presentation commands and timer ticks.
//!
//! The engine is the only thing that talks to the presentation layer. Every
//! successful mutation is followed by the matching render call, and rejected
//! commands are reported through `render_error` without touching the session.
//! Commands and ticks are handled one at a time on a single task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::ExamError;
use crate::model::{Direction, Phase};
use crate::parser::{self, QuestionSource};
use crate::review::ReviewItem;
use crate::scoring::ScoreResult;
use crate::session::{QuestionView, Session, TickReport};
use crate::timer::TimeDisplay;

/// Presentation layer notified of session changes.
pub trait ExamObserver: Send + Sync {
    fn render_question(&self, view: &QuestionView<'_>);
    fn render_progress(&self, fraction: f64);
    fn render_timer(&self, remaining: TimeDisplay);
    fn render_results(&self, score: &ScoreResult);
    fn render_review(&self, review: &[ReviewItem]);
    fn render_error(&self, error: &ExamError);
}

/// No-op observer.
pub struct NoopObserver;

impl ExamObserver for NoopObserver {
    fn render_question(&self, _: &QuestionView<'_>) {}
    fn render_progress(&self, _: f64) {}
    fn render_timer(&self, _: TimeDisplay) {}
    fn render_results(&self, _: &ScoreResult) {}
    fn render_review(&self, _: &[ReviewItem]) {}
    fn render_error(&self, _: &ExamError) {}
}

/// A user interaction forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Record an answer for any position.
    Select { position: usize, option: usize },
    /// Mark an option on the current question, committed on navigate/submit.
    Stage(usize),
    Navigate(Direction),
    Submit,
    Review,
    /// Discard the attempt and immediately start a reshuffled one.
    Restart,
    /// Redraw the current screen.
    Refresh,
    Quit,
}

/// Whether the event loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A new attempt began; the tick schedule restarts from now.
    Restarted,
    Quit,
}

/// Final state when the event loop ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExamOutcome {
    pub phase: Phase,
    pub score: Option<ScoreResult>,
    /// Number of attempts started, including restarts.
    pub attempts: u32,
    /// Questions with a recorded answer in the last attempt.
    pub answered: usize,
}

pub struct ExamEngine {
    session: Session,
    observer: Arc<dyn ExamObserver>,
    source: Option<Arc<dyn QuestionSource>>,
    tick_period: Duration,
    attempts: u32,
    ticks: u64,
}

impl ExamEngine {
    pub fn new(session: Session, observer: Arc<dyn ExamObserver>) -> Self {
        Self {
            session,
            observer,
            source: None,
            tick_period: Duration::from_secs(1),
            attempts: 0,
            ticks: 0,
        }
    }

    /// Re-fetch questions from `source` whenever `run` handles a restart.
    pub fn with_source(mut self, source: Arc<dyn QuestionSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Override the tick period (one second by default).
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Timer ticks delivered to the session so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start the first attempt and draw the opening screen.
    pub fn begin(&mut self) -> Result<(), ExamError> {
        self.session.start()?;
        self.attempts += 1;
        self.render_current();
        self.observer.render_timer(self.session.time_display());
        Ok(())
    }

    fn render_current(&self) {
        if let Some(view) = self.session.current_view() {
            self.observer.render_question(&view);
            self.observer.render_progress(self.session.progress());
        }
    }

    fn report<T>(&self, result: Result<T, ExamError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.observer.render_error(&e);
                None
            }
        }
    }

    /// Apply one command and notify the observer.
    pub fn dispatch(&mut self, command: Command) -> Flow {
        tracing::debug!(?command, "dispatch");
        match command {
            Command::Select { position, option } => {
                let result = self.session.select_answer(position, option);
                if self.report(result).is_some() {
                    self.render_current();
                }
            }
            Command::Stage(option) => {
                let result = self.session.stage_selection(option);
                if self.report(result).is_some() {
                    self.render_current();
                }
            }
            Command::Navigate(direction) => {
                let result = self.session.go_to(direction);
                if self.report(result).is_some() {
                    self.render_current();
                }
            }
            Command::Submit => {
                let result = self.session.submit();
                if let Some(score) = self.report(result) {
                    self.observer.render_results(&score);
                }
            }
            Command::Review => {
                let result = self.session.request_review();
                if let Some(review) = self.report(result) {
                    self.observer.render_review(&review);
                }
            }
            Command::Restart => {
                self.session.restart();
                return self.next_attempt();
            }
            Command::Refresh => match self.session.phase() {
                Phase::InProgress => {
                    self.render_current();
                    self.observer.render_timer(self.session.time_display());
                }
                Phase::Finished => {
                    if let Some(score) = self.session.score() {
                        self.observer.render_results(&score);
                    }
                }
                Phase::NotStarted => {}
            },
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Forward one timer tick to the session.
    pub fn on_tick(&mut self) {
        self.ticks += 1;
        match self.session.tick() {
            TickReport::Idle => {}
            TickReport::Running(display) => self.observer.render_timer(display),
            TickReport::Expired { display, score } => {
                self.observer.render_timer(display);
                self.observer.render_results(&score);
            }
        }
    }

    fn next_attempt(&mut self) -> Flow {
        let result = self.begin();
        match self.report(result) {
            Some(()) => Flow::Restarted,
            None => Flow::Continue,
        }
    }

    /// Restart over a freshly fetched question set when a source is attached.
    ///
    /// A failed fetch is reported and leaves the current attempt untouched.
    async fn reload_and_restart(&mut self) -> Flow {
        let Some(source) = self.source.clone() else {
            self.session.restart();
            return self.next_attempt();
        };

        match parser::load(source.as_ref()).await {
            Ok(store) => {
                tracing::debug!(source = %source.describe(), questions = store.len(), "questions reloaded");
                self.session.restart_with(store);
                self.next_attempt()
            }
            Err(e) => {
                self.observer.render_error(&e);
                Flow::Continue
            }
        }
    }

    /// Run until `Quit` arrives or the command channel closes.
    ///
    /// The session should already have been started with `begin`. The ticker
    /// only fires while an attempt is in progress; after submission or expiry
    /// the loop waits on commands alone.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<Command>) -> ExamOutcome {
        let mut ticker = interval_at(Instant::now() + self.tick_period, self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let in_progress = self.session.phase() == Phase::InProgress;
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("command channel closed");
                        break;
                    };
                    let flow = match command {
                        Command::Restart => self.reload_and_restart().await,
                        other => self.dispatch(other),
                    };
                    match flow {
                        Flow::Continue => {}
                        Flow::Restarted => ticker.reset(),
                        Flow::Quit => break,
                    }
                }
                _ = ticker.tick(), if in_progress => self.on_tick(),
            }
        }

        tracing::debug!(attempts = self.attempts, ticks = self.ticks, "event loop finished");
        self.outcome()
    }

    pub fn outcome(&self) -> ExamOutcome {
        ExamOutcome {
            phase: self.session.phase(),
            score: self.session.score(),
            attempts: self.attempts,
            answered: self.session.answered_count(),
        }
    }
}
