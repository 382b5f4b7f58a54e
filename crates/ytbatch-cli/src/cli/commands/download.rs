//! `ytbatch download <url>` – download one URL into a folder.

use anyhow::Result;
use std::path::PathBuf;
use ytbatch_core::config::AppConfig;
use ytbatch_core::job::{BatchConfig, Job, Quality};
use ytbatch_core::ytdlp;

use super::run::run_jobs;

/// Output folder used when neither `-o` nor `defaults.output_dir` is set.
pub(crate) fn default_output_dir(cfg: &AppConfig) -> PathBuf {
    if let Some(dir) = &cfg.defaults.output_dir {
        return dir.clone();
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Downloads")
        .join("youtube")
}

pub async fn run_download(
    cfg: &AppConfig,
    url: &str,
    output: Option<PathBuf>,
    quality: Option<Quality>,
    no_archive: bool,
    max_downloads: Option<u32>,
) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("please enter a URL");
    }
    let destination = output.unwrap_or_else(|| default_output_dir(cfg));

    let mut batch = BatchConfig::from_app(cfg);
    if let Some(q) = quality {
        batch.quality = q;
    }
    if no_archive {
        batch.use_archive = false;
    }
    batch.max_downloads = max_downloads.filter(|n| *n > 0);

    let job = Job::new(url, destination);
    println!("Starting download...");
    println!("Command: {}", ytdlp::display_command(&job, &batch, &cfg.tool));
    println!();

    run_jobs(cfg, &[job], batch, false).await?;
    Ok(())
}
