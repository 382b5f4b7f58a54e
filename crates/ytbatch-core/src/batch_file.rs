//! Save and load batch definitions as JSON.
//!
//! File layout: `{"items": [[source, destination], ...], "quality": "<label>",
//! "use_archive": bool, "created": "<ISO-8601 local time>"}`. Unknown fields
//! are ignored; missing options fall back to defaults.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::job::{Job, Quality};

/// A saved queue plus the options chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDefinition {
    pub jobs: Vec<Job>,
    pub quality: Quality,
    pub use_archive: bool,
    pub created: Option<NaiveDateTime>,
}

impl Default for BatchDefinition {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            quality: Quality::default(),
            use_archive: true,
            created: None,
        }
    }
}

impl BatchDefinition {
    pub fn new(jobs: Vec<Job>, quality: Quality, use_archive: bool) -> Self {
        Self {
            jobs,
            quality,
            use_archive,
            created: Some(chrono::Local::now().naive_local()),
        }
    }

    /// Append a job; returns its 1-based position.
    pub fn push(&mut self, job: Job) -> usize {
        self.jobs.push(job);
        self.jobs.len()
    }

    /// Remove the job at 1-based `position`.
    pub fn remove(&mut self, position: usize) -> Result<Job> {
        if position == 0 || position > self.jobs.len() {
            anyhow::bail!(
                "no item #{} in batch (it has {} item(s))",
                position,
                self.jobs.len()
            );
        }
        Ok(self.jobs.remove(position - 1))
    }

    pub fn to_json(&self) -> Result<String> {
        let file = BatchFile {
            items: self
                .jobs
                .iter()
                .map(|j| (j.source.clone(), j.destination.clone()))
                .collect(),
            quality: Some(self.quality.label().to_string()),
            use_archive: Some(self.use_archive),
            created: self.created,
        };
        serde_json::to_string_pretty(&file).context("serialize batch")
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let file: BatchFile = serde_json::from_str(data).context("parse batch")?;
        let quality = match file.quality.as_deref() {
            None => Quality::default(),
            Some(label) => Quality::from_label(label)
                .or_else(|| label.parse().ok())
                .unwrap_or_else(|| {
                    tracing::warn!("unknown quality {:?} in batch file; using default", label);
                    Quality::default()
                }),
        };
        Ok(Self {
            jobs: file
                .items
                .into_iter()
                .map(|(source, destination)| Job {
                    source,
                    destination,
                })
                .collect(),
            quality,
            use_archive: file.use_archive.unwrap_or(true),
            created: file.created,
        })
    }

    /// Write to `path`, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json).with_context(|| format!("write batch: {}", path.display()))?;
        tracing::debug!(path = %path.display(), items = self.jobs.len(), "batch saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read batch: {}", path.display()))?;
        let def =
            Self::from_json(&data).with_context(|| format!("load batch: {}", path.display()))?;
        tracing::debug!(path = %path.display(), items = def.jobs.len(), "batch loaded");
        Ok(def)
    }

    /// Load `path`, or start an empty definition when the file does not exist yet.
    pub fn load_or_new(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self {
                created: Some(chrono::Local::now().naive_local()),
                ..Self::default()
            })
        }
    }
}

/// On-disk representation.
#[derive(Debug, Serialize, Deserialize)]
struct BatchFile {
    items: Vec<(String, PathBuf)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    use_archive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchDefinition {
        BatchDefinition {
            jobs: vec![
                Job::new("https://youtube.com/@a", "/out/A"),
                Job::new("https://youtube.com/playlist?list=b", "/out/B"),
            ],
            quality: Quality::Max720,
            use_archive: true,
            created: NaiveDateTime::parse_from_str("2025-10-19T12:30:00.123456", "%Y-%m-%dT%H:%M:%S%.f").ok(),
        }
    }

    #[test]
    fn save_then_load_reproduces_definition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        let def = sample();
        def.save(&path).unwrap();
        let loaded = BatchDefinition::load(&path).unwrap();
        assert_eq!(loaded, def);
    }

    #[test]
    fn json_layout_uses_pairs_and_labels() {
        let json = sample().to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["items"][0][0], "https://youtube.com/@a");
        assert_eq!(v["items"][1][1], "/out/B");
        assert_eq!(v["quality"], "Best (≤720p)");
        assert_eq!(v["use_archive"], true);
        assert_eq!(v["created"], "2025-10-19T12:30:00.123456");
    }

    #[test]
    fn loads_file_with_unknown_fields_and_missing_options() {
        let json = r#"{
            "items": [["https://youtube.com/watch?v=x", "/tmp/x"]],
            "version": 3,
            "notes": "from another tool"
        }"#;
        let def = BatchDefinition::from_json(json).unwrap();
        assert_eq!(def.jobs, vec![Job::new("https://youtube.com/watch?v=x", "/tmp/x")]);
        assert_eq!(def.quality, Quality::Max1080);
        assert!(def.use_archive);
        assert!(def.created.is_none());
    }

    #[test]
    fn unknown_quality_label_falls_back_to_default() {
        let json = r#"{"items": [], "quality": "Potato (144p)", "use_archive": false}"#;
        let def = BatchDefinition::from_json(json).unwrap();
        assert_eq!(def.quality, Quality::Max1080);
        assert!(!def.use_archive);
    }

    #[test]
    fn short_quality_names_accepted() {
        let json = r#"{"items": [], "quality": "480p"}"#;
        assert_eq!(BatchDefinition::from_json(json).unwrap().quality, Quality::Max480);
    }

    #[test]
    fn missing_items_is_an_error() {
        assert!(BatchDefinition::from_json(r#"{"quality": "best"}"#).is_err());
    }

    #[test]
    fn push_and_remove_are_one_based() {
        let mut def = sample();
        assert_eq!(def.push(Job::new("c", "/out/C")), 3);
        let removed = def.remove(1).unwrap();
        assert_eq!(removed.source, "https://youtube.com/@a");
        assert_eq!(def.jobs.len(), 2);
        assert!(def.remove(0).is_err());
        assert!(def.remove(3).is_err());
    }

    #[test]
    fn load_or_new_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let def = BatchDefinition::load_or_new(&dir.path().join("none.json")).unwrap();
        assert!(def.jobs.is_empty());
        assert!(def.created.is_some());
    }
}
