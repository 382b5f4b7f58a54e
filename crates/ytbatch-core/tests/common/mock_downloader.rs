//! Stand-in for the external downloader, driven by `/bin/sh`.
//!
//! The script looks at its last argument (the job source) and behaves
//! accordingly:
//! - contains `fail`: prints an error on stderr and exits 1
//! - contains `slow`: prints one line, then sleeps for 30s
//! - contains `stubborn`: like `slow`, but ignores SIGTERM
//! - contains `brief`: prints one line, sleeps 1s, then succeeds
//! - contains `detach`: succeeds while a background child keeps stdout open
//! - anything else: prints two progress lines and exits 0

use std::path::PathBuf;
use std::time::Duration;

use ytbatch_core::config::ToolConfig;
use ytbatch_core::events::{BatchEvent, EventReceiver};
use ytbatch_core::runner::{BatchRunner, RunnerOptions};

const SCRIPT: &str = r#"
for arg; do last="$arg"; done
case "$last" in
  *fail*)
    echo "[youtube] Extracting URL: $last"
    echo "ERROR: [youtube] $last: Video unavailable" >&2
    exit 1
    ;;
  *slow*)
    echo "[download] Destination: slow.mp4"
    exec sleep 30
    ;;
  *stubborn*)
    trap '' TERM
    echo "[download] Destination: stubborn.mp4"
    exec sleep 30
    ;;
  *brief*)
    echo "[download] Destination: brief.mp4"
    sleep 1
    echo "[download] 100% of 1.00MiB"
    exit 0
    ;;
  *detach*)
    echo "[download] Destination: detach.mp4"
    sleep 30 &
    exit 0
    ;;
  *)
    echo "[youtube] Extracting URL: $last"
    echo "[download] 100% of 1.00MiB"
    exit 0
    ;;
esac
"#;

pub fn tool() -> ToolConfig {
    ToolConfig {
        program: PathBuf::from("/bin/sh"),
        program_args: vec!["-c".into(), SCRIPT.into(), "mock-ytdlp".into()],
        ..ToolConfig::default()
    }
}

pub fn runner() -> BatchRunner {
    runner_with_grace(Duration::from_secs(2))
}

pub fn runner_with_grace(stop_grace: Duration) -> BatchRunner {
    BatchRunner::new(
        tool(),
        RunnerOptions {
            stop_grace,
            pause_poll: Duration::from_millis(20),
        },
    )
}

/// Receive events until `RunFinished` (inclusive), failing after 20s.
pub async fn collect_until_finished(rx: &mut EventReceiver) -> Vec<BatchEvent> {
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(20), async {
        while let Some(ev) = rx.recv().await {
            let done = matches!(ev, BatchEvent::RunFinished(_));
            events.push(ev);
            if done {
                break;
            }
        }
    })
    .await
    .expect("run did not finish in time");
    events
}

pub fn started_indices(events: &[BatchEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::JobStarted { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}

pub fn log_lines(events: &[BatchEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::LogLine(l) => Some(l.clone()),
            _ => None,
        })
        .collect()
}
