//! Version query and self-update of the external downloader.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use crate::config::{ToolConfig, UpdaterConfig};

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of [`update_tool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateReport {
    Updated { from: String, to: String },
    AlreadyLatest(String),
}

impl UpdateReport {
    pub fn message(&self) -> String {
        match self {
            UpdateReport::Updated { from, to } => format!("yt-dlp updated: {from} → {to}"),
            UpdateReport::AlreadyLatest(v) => format!("yt-dlp already latest: {v}"),
        }
    }
}

struct CommandOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

async fn run_captured(
    program: &Path,
    args: &[String],
    timeout: Duration,
) -> Result<CommandOutput> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .with_context(|| {
            format!(
                "{} timed out after {}s",
                program.display(),
                timeout.as_secs()
            )
        })?
        .with_context(|| format!("run {}", program.display()))?;
    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Installed downloader version (`<program> --version`), or None if it could
/// not be determined.
pub async fn tool_version(tool: &ToolConfig) -> Option<String> {
    let mut args = tool.program_args.clone();
    args.push("--version".to_string());
    match run_captured(&tool.program, &args, VERSION_TIMEOUT).await {
        Ok(out) if out.success && !out.stdout.is_empty() => Some(out.stdout),
        Ok(out) => {
            tracing::debug!(stderr = %out.stderr, "version query failed");
            None
        }
        Err(e) => {
            tracing::debug!("version query: {:#}", e);
            None
        }
    }
}

/// Run the configured updater and compare versions before and after.
pub async fn update_tool(tool: &ToolConfig, updater: &UpdaterConfig) -> Result<UpdateReport> {
    let before = tool_version(tool)
        .await
        .unwrap_or_else(|| "Unknown".to_string());
    tracing::info!(version = %before, "updating downloader");

    let out = run_captured(
        &updater.program,
        &updater.args,
        Duration::from_secs(updater.timeout_secs.max(1)),
    )
    .await?;
    if !out.success {
        anyhow::bail!("update failed: {}", out.stderr);
    }

    let after = tool_version(tool)
        .await
        .unwrap_or_else(|| "Unknown".to_string());
    let report = if after != before {
        UpdateReport::Updated {
            from: before,
            to: after,
        }
    } else {
        UpdateReport::AlreadyLatest(after)
    };
    tracing::info!("{}", report.message());
    Ok(report)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh_tool(script: &str) -> ToolConfig {
        ToolConfig {
            program: PathBuf::from("/bin/sh"),
            program_args: vec!["-c".into(), script.into(), "fake-ytdlp".into()],
            ..ToolConfig::default()
        }
    }

    #[tokio::test]
    async fn version_is_trimmed_stdout() {
        let tool = sh_tool("echo '2025.10.22'");
        assert_eq!(tool_version(&tool).await.as_deref(), Some("2025.10.22"));
    }

    #[tokio::test]
    async fn missing_program_has_no_version() {
        let tool = ToolConfig {
            program: PathBuf::from("/nonexistent/yt-dlp"),
            ..ToolConfig::default()
        };
        assert_eq!(tool_version(&tool).await, None);
    }

    #[tokio::test]
    async fn update_reports_version_change() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("updated");
        let script = format!(
            "if [ -e '{}' ]; then echo 2.0; else echo 1.0; fi",
            marker.display()
        );
        let tool = sh_tool(&script);
        let updater = UpdaterConfig {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".into(), format!("touch '{}'", marker.display())],
            timeout_secs: 10,
        };
        let report = update_tool(&tool, &updater).await.unwrap();
        assert_eq!(
            report,
            UpdateReport::Updated {
                from: "1.0".into(),
                to: "2.0".into()
            }
        );
        assert_eq!(report.message(), "yt-dlp updated: 1.0 → 2.0");

        let again = update_tool(&tool, &updater).await.unwrap();
        assert_eq!(again, UpdateReport::AlreadyLatest("2.0".into()));
    }

    #[tokio::test]
    async fn failed_update_surfaces_stderr() {
        let tool = sh_tool("echo 1.0");
        let updater = UpdaterConfig {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".into(), "echo 'no network' >&2; exit 1".into()],
            timeout_secs: 10,
        };
        let err = update_tool(&tool, &updater).await.unwrap_err();
        assert!(err.to_string().contains("no network"));
    }
}
