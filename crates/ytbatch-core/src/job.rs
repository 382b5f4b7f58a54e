//! Jobs, per-run options and job outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::AppConfig;

/// One unit of work: a source identifier (usually a URL) and the directory it downloads into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub source: String,
    pub destination: PathBuf,
}

impl Job {
    pub fn new(source: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Resolution cap passed to the downloader as a format filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    #[serde(rename = "1080p")]
    Max1080,
    #[serde(rename = "720p")]
    Max720,
    #[serde(rename = "480p")]
    Max480,
    #[serde(rename = "best")]
    Best,
}

impl Quality {
    pub const ALL: [Quality; 4] = [
        Quality::Max1080,
        Quality::Max720,
        Quality::Max480,
        Quality::Best,
    ];

    /// Format filter for `-f`.
    pub fn format_filter(self) -> &'static str {
        match self {
            Quality::Max1080 => "best[height<=1080]",
            Quality::Max720 => "best[height<=720]",
            Quality::Max480 => "best[height<=480]",
            Quality::Best => "best",
        }
    }

    /// Human-readable label; also the value stored in batch files.
    pub fn label(self) -> &'static str {
        match self {
            Quality::Max1080 => "Best (≤1080p)",
            Quality::Max720 => "Best (≤720p)",
            Quality::Max480 => "Best (≤480p)",
            Quality::Best => "Best Available",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Quality::Max1080 => "1080p",
            Quality::Max720 => "720p",
            Quality::Max480 => "480p",
            Quality::Best => "best",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.label() == label)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quality {0:?} (expected one of 1080p, 720p, 480p, best)")]
pub struct ParseQualityError(String);

impl FromStr for Quality {
    type Err = ParseQualityError;

    /// Accepts short names (`720p`, `best`, case-insensitive) and full labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|q| q.short_name().eq_ignore_ascii_case(trimmed) || q.label() == trimmed)
            .ok_or_else(|| ParseQualityError(s.to_string()))
    }
}

/// Bounds of the randomized sleep the downloader inserts between items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepBounds {
    pub min_secs: u32,
    pub max_secs: u32,
}

impl Default for SleepBounds {
    fn default() -> Self {
        Self {
            min_secs: 3,
            max_secs: 10,
        }
    }
}

/// Options applied uniformly to every job of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub quality: Quality,
    /// Keep a per-destination archive file so previously completed items are skipped.
    pub use_archive: bool,
    /// Stop each job after this many items (None = unlimited).
    pub max_downloads: Option<u32>,
    pub concurrent_fragments: u32,
    pub sleep: SleepBounds,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            use_archive: true,
            max_downloads: None,
            concurrent_fragments: 8,
            sleep: SleepBounds::default(),
        }
    }
}

impl BatchConfig {
    /// Batch options seeded from the `[defaults]` section of the config file.
    pub fn from_app(cfg: &AppConfig) -> Self {
        let max_secs = cfg
            .defaults
            .max_sleep_interval_secs
            .max(cfg.defaults.sleep_interval_secs);
        Self {
            quality: cfg.defaults.quality,
            use_archive: cfg.defaults.use_archive,
            max_downloads: None,
            concurrent_fragments: cfg.defaults.concurrent_fragments.max(1),
            sleep: SleepBounds {
                min_secs: cfg.defaults.sleep_interval_secs,
                max_secs,
            },
        }
    }
}

/// Terminal (or current) classification of a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Pending,
    Running,
    Succeeded,
    /// Exit code when the downloader ran and exited non-zero; None when it never
    /// ran (directory or launch failure) or was killed by a signal.
    Failed(Option<i32>),
    /// The run was stopped while this job was in flight.
    Stopped,
    /// Never launched because the run was stopped first.
    Skipped,
}

impl JobOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, JobOutcome::Failed(_))
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Pending => f.write_str("pending"),
            JobOutcome::Running => f.write_str("running"),
            JobOutcome::Succeeded => f.write_str("succeeded"),
            JobOutcome::Failed(Some(code)) => write!(f, "failed (exit code {code})"),
            JobOutcome::Failed(None) => f.write_str("failed"),
            JobOutcome::Stopped => f.write_str("stopped"),
            JobOutcome::Skipped => f.write_str("skipped"),
        }
    }
}
