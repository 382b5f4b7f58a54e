//! Sequential batch runner.
//!
//! Runs an ordered queue of jobs one at a time on a background tokio task,
//! one downloader process per job. Pause takes effect between jobs; stop
//! prevents further jobs and terminates the one in flight. Every run ends
//! with exactly one `RunFinished` event.

mod error;
mod execute;
mod progress;
mod summary;

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::{RunnerConfig, ToolConfig};
use crate::control::{RunControl, RunStatus};
use crate::events::{BatchEvent, EventSender};
use crate::job::{BatchConfig, Job, JobOutcome};

pub use error::{BatchError, JobError};
pub use progress::BatchProgress;
pub use summary::RunSummary;

const BANNER: &str = "======================================================================";

/// Timing knobs for a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// How long a terminated downloader gets to exit before it is killed.
    pub stop_grace: Duration,
    /// Upper bound between flag checks while paused.
    pub pause_poll: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&RunnerConfig::default())
    }
}

impl From<&RunnerConfig> for RunnerOptions {
    fn from(cfg: &RunnerConfig) -> Self {
        Self {
            stop_grace: Duration::from_secs(cfg.stop_grace_secs),
            pause_poll: Duration::from_millis(cfg.pause_poll_ms.max(1)),
        }
    }
}

/// State shared between the runner task and the caller for one run.
#[derive(Debug)]
struct RunShared {
    control: RunControl,
    processed: AtomicUsize,
    total: usize,
}

impl RunShared {
    fn progress(&self) -> BatchProgress {
        BatchProgress {
            current: self.processed.load(Ordering::Acquire),
            total: self.total,
        }
    }
}

/// Owns at most one active run at a time and forwards pause/resume/stop to it.
#[derive(Debug)]
pub struct BatchRunner {
    tool: Arc<ToolConfig>,
    options: RunnerOptions,
    active: Arc<AtomicBool>,
    current: Mutex<Option<Arc<RunShared>>>,
}

impl BatchRunner {
    pub fn new(tool: ToolConfig, options: RunnerOptions) -> Self {
        Self {
            tool: Arc::new(tool),
            options,
            active: Arc::new(AtomicBool::new(false)),
            current: Mutex::new(None),
        }
    }

    /// Start a run over a snapshot of `jobs`. Must be called inside a tokio runtime.
    ///
    /// Fails with [`BatchError::EmptyQueue`] when `jobs` is empty and
    /// [`BatchError::InvalidState`] when a run is still active.
    pub fn start(
        &self,
        jobs: &[Job],
        config: BatchConfig,
        events: EventSender,
    ) -> std::result::Result<RunHandle, BatchError> {
        if jobs.is_empty() {
            return Err(BatchError::EmptyQueue);
        }
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BatchError::InvalidState);
        }

        let shared = Arc::new(RunShared {
            control: RunControl::new(),
            processed: AtomicUsize::new(0),
            total: jobs.len(),
        });
        shared.control.set_status(RunStatus::Running);
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&shared));

        tracing::info!(
            jobs = jobs.len(),
            quality = config.quality.short_name(),
            use_archive = config.use_archive,
            "batch run started"
        );

        let run = BatchRun {
            jobs: jobs.to_vec(),
            config,
            tool: Arc::clone(&self.tool),
            options: self.options,
            shared: Arc::clone(&shared),
            active: Arc::clone(&self.active),
            events,
        };
        let join = tokio::spawn(run.execute());
        Ok(RunHandle { join, shared })
    }

    fn with_current(&self, f: impl FnOnce(&RunShared)) {
        let guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(shared) = guard.as_ref() {
            f(shared);
        }
    }

    /// Hold the queue before the next job starts. The job in flight keeps running.
    pub fn pause(&self) {
        self.with_current(|s| s.control.pause());
    }

    pub fn resume(&self) {
        self.with_current(|s| s.control.resume());
    }

    /// Stop the active run. Idempotent; a no-op when no run is active.
    pub fn stop(&self) {
        self.with_current(|s| s.control.stop());
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Status of the most recent run (`Idle` before the first one).
    pub fn status(&self) -> RunStatus {
        let mut status = RunStatus::Idle;
        self.with_current(|s| status = s.control.status());
        status
    }

    /// Progress of the most recent run, if any.
    pub fn progress(&self) -> Option<BatchProgress> {
        let mut progress = None;
        self.with_current(|s| progress = Some(s.progress()));
        progress
    }
}

/// Handle to a started run.
#[derive(Debug)]
pub struct RunHandle {
    join: JoinHandle<RunSummary>,
    shared: Arc<RunShared>,
}

impl RunHandle {
    pub fn status(&self) -> RunStatus {
        self.shared.control.status()
    }

    pub fn progress(&self) -> BatchProgress {
        self.shared.progress()
    }

    /// Wait for the run to finish and return its summary.
    pub async fn wait(self) -> Result<RunSummary> {
        self.join.await.context("batch run task join")
    }
}

/// Private execution state of one run; lives on the runner task.
struct BatchRun {
    jobs: Vec<Job>,
    config: BatchConfig,
    tool: Arc<ToolConfig>,
    options: RunnerOptions,
    shared: Arc<RunShared>,
    active: Arc<AtomicBool>,
    events: EventSender,
}

impl BatchRun {
    fn emit(&self, event: BatchEvent) {
        let _ = self.events.send(event);
    }

    fn log(&self, line: impl Into<String>) {
        self.emit(BatchEvent::LogLine(line.into()));
    }

    async fn execute(self) -> RunSummary {
        let total = self.jobs.len();
        let control = &self.shared.control;
        let mut outcomes = vec![JobOutcome::Pending; total];
        let mut stopped = false;

        for index in 0..total {
            if control.is_stop_requested() {
                stopped = true;
                break;
            }
            if control.is_paused() {
                control.transition(RunStatus::Running, RunStatus::Paused);
                tracing::info!("batch paused before item {}/{}", index + 1, total);
                control.wait_while_paused(self.options.pause_poll).await;
                if control.is_stop_requested() {
                    stopped = true;
                    break;
                }
                control.transition(RunStatus::Paused, RunStatus::Running);
                tracing::info!("batch resumed");
            }

            outcomes[index] = JobOutcome::Running;
            let outcome = self.run_job(index, &self.jobs[index]).await;
            outcomes[index] = outcome;
            self.shared.processed.fetch_add(1, Ordering::AcqRel);
            self.emit(BatchEvent::JobFinished { index, outcome });

            if outcome == JobOutcome::Stopped {
                stopped = true;
                break;
            }
        }

        if stopped {
            for outcome in outcomes.iter_mut().filter(|o| **o == JobOutcome::Pending) {
                *outcome = JobOutcome::Skipped;
            }
        }

        let summary = RunSummary::from_outcomes(outcomes, stopped);
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            not_processed = summary.not_processed,
            "{}",
            summary.message()
        );
        let status = if stopped {
            RunStatus::Stopped
        } else {
            RunStatus::Completed
        };
        control.set_status(status);
        tracing::debug!(status = status.as_str(), "batch run finished");
        self.active.store(false, Ordering::Release);
        self.emit(BatchEvent::RunFinished(summary.clone()));
        summary
    }

    async fn run_job(&self, index: usize, job: &Job) -> JobOutcome {
        let total = self.jobs.len();
        let item = index + 1;

        let dir_ready = tokio::fs::create_dir_all(&job.destination)
            .await
            .map_err(|source| JobError::DirectoryCreation {
                path: job.destination.clone(),
                source,
            });

        self.emit(BatchEvent::JobStarted {
            index,
            total,
            job: job.clone(),
        });
        self.log(BANNER);
        self.log(format!("Batch Item {item}/{total}"));
        self.log(format!("URL: {}", job.source));
        self.log(format!("Output: {}", job.destination.display()));
        self.log(BANNER);
        self.emit(BatchEvent::ItemStatus(format!(
            "Downloading item {item}/{total}..."
        )));
        tracing::info!(item, total, source = %job.source, "job started");

        let result = match dir_ready {
            Ok(()) => {
                execute::run_process(
                    job,
                    &self.config,
                    &self.tool,
                    &self.shared.control,
                    self.options.stop_grace,
                    &self.events,
                )
                .await
            }
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(()) => JobOutcome::Succeeded,
            Err(e) => e.outcome(),
        };
        match (&result, outcome) {
            (Ok(()), _) => self.log(format!("Item {item}/{total} completed successfully!")),
            (Err(_), JobOutcome::Stopped) => {
                self.log(format!("Batch stopped at item {item}/{total}"))
            }
            (Err(JobError::ProcessExit { code: Some(code) }), _) => {
                self.log(format!("Item {item}/{total} failed (exit code: {code})"))
            }
            (Err(e), _) => self.log(format!("Item {item}/{total} failed: {e}")),
        }
        tracing::info!(item, total, %outcome, "job finished");
        outcome
    }
}
