//! examsim-core: exam session state machine, timer, scoring, and review.
//!
//! This crate defines the question model, the question loader, and the
//! session logic that every examsim front end drives.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod review;
pub mod scoring;
pub mod session;
pub mod shuffle;
pub mod timer;

pub use error::ExamError;
pub use model::{Direction, Phase, Question, QuestionStore};
pub use session::Session;
