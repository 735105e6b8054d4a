//! Exam countdown.
//!
//! `Countdown` is a logical clock: it only moves when `tick` is called. The
//! engine calls it once per second from a tokio interval, and tests call it
//! directly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Four hours.
pub const DEFAULT_DURATION_SECS: u64 = 4 * 60 * 60;

/// Remaining time split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDisplay {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeDisplay {
    pub fn from_secs(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for TimeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown is stopped; nothing changed.
    Idle,
    /// One second elapsed and time remains.
    Running(TimeDisplay),
    /// The countdown reached zero on this tick and stopped itself.
    Expired(TimeDisplay),
}

/// A stoppable countdown measured in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u64,
    remaining: u64,
    running: bool,
}

impl Countdown {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration: duration_secs,
            remaining: duration_secs,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop permanently until the next `reset`/`start`.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop and restore the full duration.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.duration;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        let display = TimeDisplay::from_secs(self.remaining);

        if self.remaining == 0 {
            self.running = false;
            TickOutcome::Expired(display)
        } else {
            TickOutcome::Running(display)
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.duration - self.remaining
    }

    pub fn display(&self) -> TimeDisplay {
        TimeDisplay::from_secs(self.remaining)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}
