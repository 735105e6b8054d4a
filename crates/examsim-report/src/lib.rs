//! examsim-report: report generation for finished exam attempts.
//!
//! Renders an `ExamReport` as a self-contained HTML review page.

pub mod html;

pub use html::{generate_html, write_html_report};
