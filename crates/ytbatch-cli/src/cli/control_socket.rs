//! Control socket: server (during a batch run) and client (for `ytbatch pause/resume/stop`).
//! Protocol: one command per line: "pause", "resume" or "stop".

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use ytbatch_core::runner::BatchRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Stop,
}

impl ControlCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlCommand::Pause => "pause",
            ControlCommand::Resume => "resume",
            ControlCommand::Stop => "stop",
        }
    }

    /// Parse one protocol line. Unknown lines yield None.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "pause" => Some(ControlCommand::Pause),
            "resume" => Some(ControlCommand::Resume),
            "stop" => Some(ControlCommand::Stop),
            _ => None,
        }
    }

    pub fn apply(self, runner: &BatchRunner) {
        match self {
            ControlCommand::Pause => runner.pause(),
            ControlCommand::Resume => runner.resume(),
            ControlCommand::Stop => runner.stop(),
        }
    }
}

/// Spawns a task that listens on `path` and applies each command line to
/// `runner`. Ignores malformed lines.
#[cfg(unix)]
pub fn spawn_control_listener(
    runner: Arc<BatchRunner>,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::UnixListener;

    let path = path.as_ref().to_path_buf();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let runner = Arc::clone(&runner);
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            match ControlCommand::parse(&line) {
                                Some(cmd) => {
                                    tracing::info!("control socket: {}", cmd.as_str());
                                    cmd.apply(&runner);
                                }
                                None => tracing::debug!("control socket: ignored {:?}", line),
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

#[cfg(not(unix))]
pub fn spawn_control_listener(
    _runner: Arc<BatchRunner>,
    _path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    anyhow::bail!("control socket is only supported on unix")
}

/// Sends one command line to the control socket of the active run.
#[cfg(unix)]
pub async fn send_command(socket_path: &Path, cmd: ControlCommand) -> Result<()> {
    use anyhow::Context;
    use tokio::io::AsyncWriteExt;

    if !socket_path.exists() {
        anyhow::bail!("no active batch run (no control socket at {})", socket_path.display());
    }
    let mut stream = tokio::net::UnixStream::connect(socket_path)
        .await
        .with_context(|| format!("connect control socket: {}", socket_path.display()))?;
    let msg = format!("{}\n", cmd.as_str());
    stream.write_all(msg.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

#[cfg(not(unix))]
pub async fn send_command(_socket_path: &Path, _cmd: ControlCommand) -> Result<()> {
    anyhow::bail!("control socket is only supported on unix")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_commands() {
        assert_eq!(ControlCommand::parse("pause\n"), Some(ControlCommand::Pause));
        assert_eq!(ControlCommand::parse(" resume "), Some(ControlCommand::Resume));
        assert_eq!(ControlCommand::parse("stop"), Some(ControlCommand::Stop));
        assert_eq!(ControlCommand::parse("pause 1"), None);
        assert_eq!(ControlCommand::parse(""), None);
    }

    #[test]
    fn commands_round_trip_through_wire_form() {
        for cmd in [ControlCommand::Pause, ControlCommand::Resume, ControlCommand::Stop] {
            assert_eq!(ControlCommand::parse(cmd.as_str()), Some(cmd));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn socket_commands_reach_the_runner() {
        use std::time::Duration;
        use ytbatch_core::config::ToolConfig;
        use ytbatch_core::control::RunStatus;
        use ytbatch_core::events;
        use ytbatch_core::job::{BatchConfig, Job};
        use ytbatch_core::runner::RunnerOptions;

        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("control.sock");
        let runner = Arc::new(BatchRunner::new(
            ToolConfig::default(),
            RunnerOptions::default(),
        ));
        let listener = spawn_control_listener(Arc::clone(&runner), &socket).unwrap();

        let (tx, mut rx) = events::channel();
        let jobs = vec![Job::new("https://example.com/v", dir.path().join("out"))];
        let handle = runner.start(&jobs, BatchConfig::default(), tx).unwrap();
        runner.pause();

        send_command(&socket, ControlCommand::Stop).await.unwrap();
        let summary = tokio::time::timeout(Duration::from_secs(10), handle.wait())
            .await
            .unwrap()
            .unwrap();
        assert!(summary.stopped);
        assert_eq!(runner.status(), RunStatus::Stopped);
        while rx.try_recv().is_ok() {}
        listener.abort();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn send_without_socket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = send_command(&dir.path().join("missing.sock"), ControlCommand::Pause)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no active batch run"));
    }
}
