//! Run one downloader process: relay its output line by line, honour stop,
//! and classify the exit.

use std::process::ExitStatus;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ToolConfig;
use crate::control::RunControl;
use crate::events::{BatchEvent, EventSender};
use crate::job::{BatchConfig, Job};
use crate::ytdlp;

use super::error::JobError;

/// How long output is still relayed after the downloader has exited.
const OUTPUT_DRAIN: Duration = Duration::from_secs(2);

/// Spawn the downloader for `job` and wait for it. Every output line of stdout
/// and stderr is sent as a `LogLine` as soon as it arrives.
pub(super) async fn run_process(
    job: &Job,
    batch: &BatchConfig,
    tool: &ToolConfig,
    control: &RunControl,
    stop_grace: Duration,
    events: &EventSender,
) -> Result<(), JobError> {
    let mut cmd = ytdlp::command(job, batch, tool);
    tracing::debug!(command = %ytdlp::display_command(job, batch, tool), "spawning downloader");
    let mut child = cmd.spawn().map_err(|source| JobError::ProcessLaunch {
        program: tool.program.display().to_string(),
        source,
    })?;

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    let readers = [
        child.stdout.take().map(|s| spawn_line_reader(s, line_tx.clone())),
        child.stderr.take().map(|s| spawn_line_reader(s, line_tx)),
    ];

    // Exit is watched alongside output so a grandchild holding the pipes open
    // cannot keep a finished job running.
    let mut lines_open = true;
    let status = loop {
        tokio::select! {
            status = child.wait() => break Some(status),
            line = line_rx.recv(), if lines_open => match line {
                Some(line) => {
                    let _ = events.send(BatchEvent::LogLine(line));
                }
                None => lines_open = false,
            },
            _ = control.stopped() => break None,
        }
    };

    let status = match status {
        Some(status) => status,
        None => {
            terminate(&mut child, stop_grace).await;
            abort_readers(readers);
            return Err(JobError::StoppedByUser);
        }
    };

    let drain = async {
        while let Some(line) = line_rx.recv().await {
            let _ = events.send(BatchEvent::LogLine(line));
        }
    };
    if tokio::time::timeout(OUTPUT_DRAIN, drain).await.is_err() {
        tracing::debug!("downloader output still open after exit; detaching");
    }
    abort_readers(readers);

    match status {
        Ok(status) => classify_exit(status),
        Err(e) => {
            tracing::warn!("waiting for downloader failed: {}", e);
            Err(JobError::ProcessExit { code: None })
        }
    }
}

fn abort_readers(readers: [Option<JoinHandle<()>>; 2]) {
    for handle in readers.into_iter().flatten() {
        handle.abort();
    }
}

fn classify_exit(status: ExitStatus) -> Result<(), JobError> {
    if status.success() {
        Ok(())
    } else {
        Err(JobError::ProcessExit {
            code: status.code(),
        })
    }
}

/// Read `stream` until EOF, forwarding each non-empty trimmed line. Carriage
/// returns split lines too, so in-place progress updates arrive one by one.
fn spawn_line_reader<R>(stream: R, tx: mpsc::UnboundedSender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    for part in text.split(|c: char| c == '\r' || c == '\n') {
                        let part = part.trim();
                        if !part.is_empty() && tx.send(part.to_string()).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!("downloader output read: {}", e);
                    break;
                }
            }
        }
    })
}

/// Ask the child to exit, then force-kill it if it is still alive after `grace`.
async fn terminate(child: &mut Child, grace: Duration) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            let r = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
            if r != 0 {
                tracing::debug!(
                    "SIGTERM to pid {} failed: {}",
                    pid,
                    std::io::Error::last_os_error()
                );
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(_) => tracing::debug!("downloader exited after terminate"),
        Err(_) => {
            tracing::warn!(
                "downloader still running {}s after terminate; killing",
                grace.as_secs()
            );
            if let Err(e) = child.kill().await {
                tracing::warn!("kill downloader: {}", e);
            }
        }
    }
}
