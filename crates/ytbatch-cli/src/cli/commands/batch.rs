//! `ytbatch batch ...` – edit and run batch files.

use anyhow::Result;
use std::path::Path;
use ytbatch_core::batch_file::BatchDefinition;
use ytbatch_core::config::AppConfig;
use ytbatch_core::job::{BatchConfig, Job, Quality};

use super::run::run_jobs;

pub async fn run_batch_file(
    cfg: &AppConfig,
    file: &Path,
    quality: Option<Quality>,
    no_archive: bool,
) -> Result<()> {
    let def = BatchDefinition::load(file)?;
    if def.jobs.is_empty() {
        anyhow::bail!("batch queue is empty: {}", file.display());
    }

    let mut batch = BatchConfig::from_app(cfg);
    batch.quality = quality.unwrap_or(def.quality);
    batch.use_archive = def.use_archive && !no_archive;

    println!(
        "Starting batch: {} item(s), quality {}, archive {}",
        def.jobs.len(),
        batch.quality,
        if batch.use_archive { "on" } else { "off" }
    );
    let summary = run_jobs(cfg, &def.jobs, batch, true).await?;
    tracing::info!(path = %file.display(), succeeded = summary.succeeded, "batch file done");
    Ok(())
}

pub fn run_batch_add(
    file: &Path,
    url: &str,
    output: &Path,
    quality: Option<Quality>,
    archive: Option<bool>,
) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("please enter a URL");
    }
    let mut def = BatchDefinition::load_or_new(file)?;
    if let Some(q) = quality {
        def.quality = q;
    }
    if let Some(a) = archive {
        def.use_archive = a;
    }
    let position = def.push(Job::new(url, output));
    def.save(file)?;
    println!("Added item {position}: {url} -> {}", output.display());
    Ok(())
}

pub fn run_batch_remove(file: &Path, position: usize) -> Result<()> {
    let mut def = BatchDefinition::load(file)?;
    let job = def.remove(position)?;
    def.save(file)?;
    println!("Removed item {position}: {}", job.source);
    Ok(())
}

pub fn run_batch_clear(file: &Path) -> Result<()> {
    let mut def = BatchDefinition::load(file)?;
    let count = def.jobs.len();
    def.jobs.clear();
    def.save(file)?;
    println!("Cleared {count} item(s) from {}", file.display());
    Ok(())
}

pub fn run_batch_show(file: &Path) -> Result<()> {
    let def = BatchDefinition::load(file)?;
    println!("Quality: {}", def.quality);
    println!(
        "Download archive: {}",
        if def.use_archive { "on" } else { "off" }
    );
    if let Some(created) = def.created {
        println!("Created: {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
    if def.jobs.is_empty() {
        println!("Batch queue is empty.");
        return Ok(());
    }
    println!("{:<4} {:<50} {}", "#", "URL", "OUTPUT");
    for (i, job) in def.jobs.iter().enumerate() {
        println!(
            "{:<4} {:<50} {}",
            i + 1,
            job.source,
            job.destination.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_clear_edit_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("queue.json");

        run_batch_add(&file, " https://youtube.com/@a ", Path::new("/out/a"), None, None).unwrap();
        run_batch_add(
            &file,
            "https://youtube.com/@b",
            Path::new("/out/b"),
            Some(Quality::Max480),
            Some(false),
        )
        .unwrap();
        let def = BatchDefinition::load(&file).unwrap();
        assert_eq!(def.jobs.len(), 2);
        assert_eq!(def.jobs[0].source, "https://youtube.com/@a");
        assert_eq!(def.quality, Quality::Max480);
        assert!(!def.use_archive);

        run_batch_remove(&file, 1).unwrap();
        let def = BatchDefinition::load(&file).unwrap();
        assert_eq!(def.jobs, vec![Job::new("https://youtube.com/@b", "/out/b")]);
        assert!(run_batch_remove(&file, 5).is_err());

        run_batch_clear(&file).unwrap();
        let def = BatchDefinition::load(&file).unwrap();
        assert!(def.jobs.is_empty());
        assert_eq!(def.quality, Quality::Max480);
    }

    #[test]
    fn add_rejects_blank_url() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("queue.json");
        assert!(run_batch_add(&file, "   ", Path::new("/out"), None, None).is_err());
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn running_empty_batch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("queue.json");
        BatchDefinition::default().save(&file).unwrap();
        let err = run_batch_file(&AppConfig::default(), &file, None, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
