//! `ytbatch version` – show program and downloader versions.

use anyhow::Result;
use ytbatch_core::config::AppConfig;
use ytbatch_core::tool;

pub async fn run_version(cfg: &AppConfig) -> Result<()> {
    println!("ytbatch {}", env!("CARGO_PKG_VERSION"));
    match tool::tool_version(&cfg.tool).await {
        Some(v) => println!("yt-dlp version: {v}"),
        None => println!("yt-dlp version: Unknown ({} not found)", cfg.tool.program.display()),
    }
    Ok(())
}
