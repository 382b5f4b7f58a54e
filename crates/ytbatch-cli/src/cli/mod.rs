//! CLI for the ytbatch downloader.

mod commands;
mod control_socket;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ytbatch_core::config;
use ytbatch_core::job::Quality;

use commands::{
    run_batch_add, run_batch_clear, run_batch_file, run_batch_remove, run_batch_show,
    run_completions, run_control, run_download, run_update, run_version,
};
use control_socket::ControlCommand;

/// Top-level CLI for ytbatch.
#[derive(Debug, Parser)]
#[command(name = "ytbatch")]
#[command(about = "ytbatch: sequential yt-dlp batch downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a single video, playlist or channel URL.
    Download {
        /// Video, playlist or channel URL.
        url: String,
        /// Output directory (default: config `defaults.output_dir` or ~/Downloads/youtube).
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Resolution cap: 1080p, 720p, 480p or best.
        #[arg(short, long, value_name = "QUALITY")]
        quality: Option<Quality>,
        /// Do not keep a download archive (re-download items seen before).
        #[arg(long)]
        no_archive: bool,
        /// Stop after N items (0 = unlimited).
        #[arg(long, value_name = "N")]
        max_downloads: Option<u32>,
    },

    /// Create, edit and run batch files of (URL, output folder) items.
    #[command(subcommand)]
    Batch(BatchCommand),

    /// Hold the active batch before its next item.
    Pause,

    /// Continue a paused batch.
    Resume,

    /// Stop the active batch and terminate the item in flight.
    Stop,

    /// Show ytbatch and yt-dlp versions.
    Version,

    /// Update yt-dlp using the configured updater command.
    Update,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum BatchCommand {
    /// Run every item of a batch file in order.
    Run {
        /// Path to the batch file (JSON).
        file: PathBuf,
        /// Override the quality stored in the file.
        #[arg(short, long, value_name = "QUALITY")]
        quality: Option<Quality>,
        /// Disable the download archive for this run.
        #[arg(long)]
        no_archive: bool,
    },

    /// Append an item; creates the batch file if needed.
    Add {
        /// Path to the batch file (JSON).
        file: PathBuf,
        /// Video, playlist or channel URL.
        url: String,
        /// Output folder for this item.
        output: PathBuf,
        /// Set the batch quality.
        #[arg(short, long, value_name = "QUALITY")]
        quality: Option<Quality>,
        /// Set whether the batch uses the download archive (true/false).
        #[arg(long, value_name = "BOOL")]
        archive: Option<bool>,
    },

    /// Remove the item at a 1-based position.
    Remove {
        /// Path to the batch file (JSON).
        file: PathBuf,
        /// Item number as shown by `batch show`.
        position: usize,
    },

    /// Remove all items, keeping the batch options.
    Clear {
        /// Path to the batch file (JSON).
        file: PathBuf,
    },

    /// List the items and options of a batch file.
    Show {
        /// Path to the batch file (JSON).
        file: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download {
                url,
                output,
                quality,
                no_archive,
                max_downloads,
            } => run_download(&cfg, &url, output, quality, no_archive, max_downloads).await?,
            CliCommand::Batch(cmd) => match cmd {
                BatchCommand::Run {
                    file,
                    quality,
                    no_archive,
                } => run_batch_file(&cfg, &file, quality, no_archive).await?,
                BatchCommand::Add {
                    file,
                    url,
                    output,
                    quality,
                    archive,
                } => run_batch_add(&file, &url, &output, quality, archive)?,
                BatchCommand::Remove { file, position } => run_batch_remove(&file, position)?,
                BatchCommand::Clear { file } => run_batch_clear(&file)?,
                BatchCommand::Show { file } => run_batch_show(&file)?,
            },
            CliCommand::Pause => run_control(ControlCommand::Pause).await?,
            CliCommand::Resume => run_control(ControlCommand::Resume).await?,
            CliCommand::Stop => run_control(ControlCommand::Stop).await?,
            CliCommand::Version => run_version(&cfg).await?,
            CliCommand::Update => run_update(&cfg).await?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
