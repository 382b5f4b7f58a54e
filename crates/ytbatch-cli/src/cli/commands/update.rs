//! `ytbatch update` – update yt-dlp with the configured updater.

use anyhow::Result;
use ytbatch_core::config::AppConfig;
use ytbatch_core::tool;

pub async fn run_update(cfg: &AppConfig) -> Result<()> {
    println!("Updating yt-dlp...");
    let report = tool::update_tool(&cfg.tool, &cfg.updater).await?;
    println!("{}", report.message());
    Ok(())
}
