//! Exam configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::scoring::TierPolicy;
use crate::timer::DEFAULT_DURATION_SECS;

/// Top-level examsim configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Title shown in headers and reports.
    #[serde(default = "default_title")]
    pub title: String,
    /// Exam length in seconds.
    #[serde(default = "default_duration")]
    pub duration_secs: u64,
    /// Shuffle question order for each attempt.
    #[serde(default = "default_true")]
    pub shuffle: bool,
    /// Fixed RNG seed for reproducible question order.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Feedback tier cutoffs.
    #[serde(default)]
    pub tiers: TierPolicy,
}

fn default_title() -> String {
    "Practice Exam".to_string()
}
fn default_duration() -> u64 {
    DEFAULT_DURATION_SECS
}
fn default_true() -> bool {
    true
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            duration_secs: default_duration(),
            shuffle: true,
            seed: None,
            tiers: TierPolicy::default(),
        }
    }
}

impl ExamConfig {
    pub fn validate(&self) -> Result<(), ExamError> {
        if self.duration_secs == 0 {
            return Err(ExamError::Config("duration_secs must be positive".into()));
        }
        self.tiers.validate()
    }

    /// Apply `EXAMSIM_DURATION_SECS` and `EXAMSIM_SEED` from `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup("EXAMSIM_DURATION_SECS") {
            self.duration_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid EXAMSIM_DURATION_SECS: '{raw}'"))?;
        }
        if let Some(raw) = lookup("EXAMSIM_SEED") {
            self.seed = Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("invalid EXAMSIM_SEED: '{raw}'"))?,
            );
        }
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examsim.toml` in the current directory
/// 2. `~/.config/examsim/config.toml`
///
/// Environment variable overrides: `EXAMSIM_DURATION_SECS`, `EXAMSIM_SEED`.
pub fn load_config() -> Result<ExamConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamConfig> {
    load_config_with(path, |key| std::env::var(key).ok())
}

fn load_config_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ExamConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examsim.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamConfig::default(),
    };

    config.apply_env_overrides(env)?;
    config.validate()?;

    Ok(config)
}

/// Parse a TOML config document.
pub fn parse_config_str(content: &str) -> Result<ExamConfig> {
    Ok(toml::from_str(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examsim"))
}
