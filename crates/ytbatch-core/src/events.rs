//! Events emitted by a batch run and the observer surface that consumes them.
//!
//! The runner only ever pushes [`BatchEvent`]s into an unbounded channel; a
//! front end either matches on the events directly or implements
//! [`BatchObserver`] and lets [`dispatch_events`] drive it.

use tokio::sync::mpsc;

use crate::job::{Job, JobOutcome};
use crate::runner::{BatchProgress, RunSummary};

/// Ordered stream of run events. For job `i`, all `LogLine`s and its
/// `JobFinished` are emitted before any event of job `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    JobStarted { index: usize, total: usize, job: Job },
    /// One line of downloader output (or a runner banner line).
    LogLine(String),
    /// Short status text for the item in flight.
    ItemStatus(String),
    JobFinished { index: usize, outcome: JobOutcome },
    /// Terminal event; exactly one per run.
    RunFinished(RunSummary),
}

pub type EventSender = mpsc::UnboundedSender<BatchEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<BatchEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Callbacks for a front end (GUI, CLI, logger). No business logic lives here.
pub trait BatchObserver {
    fn on_log(&mut self, line: &str);
    fn on_progress(&mut self, progress: BatchProgress);
    fn on_item_status(&mut self, text: &str);
    fn on_finished(&mut self, success: bool, summary: &str);
}

/// Feed events from `rx` into `observer` until the run finishes or the channel
/// closes. Returns the summary if a `RunFinished` was seen.
pub async fn dispatch_events<O: BatchObserver + ?Sized>(
    rx: &mut EventReceiver,
    observer: &mut O,
) -> Option<RunSummary> {
    let mut total = 0;
    while let Some(event) = rx.recv().await {
        match event {
            BatchEvent::JobStarted { total: t, .. } => total = t,
            BatchEvent::LogLine(line) => observer.on_log(&line),
            BatchEvent::ItemStatus(text) => observer.on_item_status(&text),
            BatchEvent::JobFinished { index, .. } => observer.on_progress(BatchProgress {
                current: index + 1,
                total,
            }),
            BatchEvent::RunFinished(summary) => {
                observer.on_finished(summary.success(), &summary.message());
                return Some(summary);
            }
        }
    }
    None
}
