//! Argument contract for the external downloader.
//!
//! The argv is a pure function of `(job, batch config, tool config)` so it can
//! be logged and tested without spawning anything.

use std::ffi::OsString;
use std::process::Stdio;

use crate::config::ToolConfig;
use crate::job::{BatchConfig, Job};

/// Build the full argument list (excluding the program itself) for one job.
pub fn build_args(job: &Job, batch: &BatchConfig, tool: &ToolConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = tool.program_args.iter().map(OsString::from).collect();

    args.push("--cookies-from-browser".into());
    args.push(tool.cookies_browser.clone().into());
    args.push(tool.ip_version.flag().into());
    args.push("--extractor-args".into());
    args.push(tool.extractor_args.clone().into());

    args.push("-f".into());
    args.push(batch.quality.format_filter().into());

    if batch.use_archive {
        args.push("--download-archive".into());
        args.push(job.destination.join(&tool.archive_file_name).into_os_string());
    }

    if let Some(max) = batch.max_downloads.filter(|m| *m > 0) {
        args.push("--max-downloads".into());
        args.push(max.to_string().into());
    }

    args.push("--sleep-interval".into());
    args.push(batch.sleep.min_secs.to_string().into());
    args.push("--max-sleep-interval".into());
    args.push(batch.sleep.max_secs.to_string().into());
    args.push("--ignore-errors".into());
    args.push("--no-abort-on-error".into());
    args.push("--write-info-json".into());
    args.push("--concurrent-fragments".into());
    args.push(batch.concurrent_fragments.to_string().into());
    args.push("-o".into());
    args.push(job.destination.join(&tool.output_template).into_os_string());
    args.push(job.source.clone().into());
    args
}

/// A ready-to-spawn command: stdout and stderr piped, stdin closed, killed if dropped.
pub fn command(job: &Job, batch: &BatchConfig, tool: &ToolConfig) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(&tool.program);
    cmd.args(build_args(job, batch, tool))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Shell-like rendering of the command line, for log output.
pub fn display_command(job: &Job, batch: &BatchConfig, tool: &ToolConfig) -> String {
    let mut parts = vec![tool.program.to_string_lossy().into_owned()];
    parts.extend(
        build_args(job, batch, tool)
            .iter()
            .map(|a| a.to_string_lossy().into_owned()),
    );
    parts.join(" ")
}
