//! Shared run loop for `ytbatch download` and `ytbatch batch run`.

use anyhow::Result;
use std::sync::Arc;
use ytbatch_core::config::AppConfig;
use ytbatch_core::events::{self, dispatch_events};
use ytbatch_core::job::{BatchConfig, Job};
use ytbatch_core::runner::{BatchRunner, RunSummary, RunnerOptions};

use crate::cli::console::ConsoleObserver;
use crate::cli::control_socket;

/// Run `jobs` to completion, printing output as it arrives. While the run is
/// active, `ytbatch pause/resume/stop` reach it through the control socket and
/// Ctrl-C stops it. Fails if any item failed or the run was stopped.
pub(super) async fn run_jobs(
    cfg: &AppConfig,
    jobs: &[Job],
    batch: BatchConfig,
    show_progress: bool,
) -> Result<RunSummary> {
    let runner = Arc::new(BatchRunner::new(
        cfg.tool.clone(),
        RunnerOptions::from(&cfg.runner),
    ));

    let (tx, mut rx) = events::channel();
    let handle = runner.start(jobs, batch, tx)?;

    let socket_path = ytbatch_core::control::default_control_socket_path().ok();
    let listener = socket_path.as_ref().and_then(|path| {
        match control_socket::spawn_control_listener(Arc::clone(&runner), path) {
            Ok(handle) => {
                tracing::debug!(path = %path.display(), "control socket listening");
                Some(handle)
            }
            Err(e) => {
                tracing::warn!("control socket unavailable: {:#}", e);
                None
            }
        }
    });

    let ctrl_c = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Stopping...");
                runner.stop();
            }
        })
    };

    let mut console = ConsoleObserver { show_progress };
    dispatch_events(&mut rx, &mut console).await;
    let summary = handle.wait().await;

    ctrl_c.abort();
    if let Some(listener) = listener {
        listener.abort();
        if let Some(path) = &socket_path {
            let _ = std::fs::remove_file(path);
        }
    }

    let summary = summary?;
    if summary.stopped {
        anyhow::bail!("batch stopped by user");
    }
    if summary.failed > 0 {
        anyhow::bail!("{} of {} item(s) failed", summary.failed, summary.total);
    }
    Ok(summary)
}
