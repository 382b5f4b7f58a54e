//! Run control for pause/resume/stop: shared flags set from the caller's
//! context and observed by the runner task.
//!
//! Pause is only honoured between jobs. Stop is observed between jobs and
//! while a job's process is running; every state change wakes the runner
//! through a `Notify` so it never spins.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// Lifecycle of a run as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Paused,
    Stopping,
    Stopped,
    Completed,
}

impl RunStatus {
    fn to_u8(self) -> u8 {
        match self {
            RunStatus::Idle => 0,
            RunStatus::Running => 1,
            RunStatus::Paused => 2,
            RunStatus::Stopping => 3,
            RunStatus::Stopped => 4,
            RunStatus::Completed => 5,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => RunStatus::Running,
            2 => RunStatus::Paused,
            3 => RunStatus::Stopping,
            4 => RunStatus::Stopped,
            5 => RunStatus::Completed,
            _ => RunStatus::Idle,
        }
    }

    /// True once the run has reached a terminal state.
    pub fn is_finished(self) -> bool {
        matches!(self, RunStatus::Stopped | RunStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Paused => "paused",
            RunStatus::Stopping => "stopping",
            RunStatus::Stopped => "stopped",
            RunStatus::Completed => "completed",
        }
    }
}

/// Pause/stop flags for one run.
#[derive(Debug)]
pub struct RunControl {
    paused: AtomicBool,
    stopped: AtomicBool,
    status: AtomicU8,
    wake: Notify,
}

impl Default for RunControl {
    fn default() -> Self {
        Self {
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            status: AtomicU8::new(RunStatus::Idle.to_u8()),
            wake: Notify::new(),
        }
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set_status(&self, status: RunStatus) {
        self.status.store(status.to_u8(), Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Request a pause before the next job starts. The status only becomes
    /// `Paused` once the runner reaches a job boundary and actually waits.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.wake.notify_waiters();
    }

    /// Move from `from` to `to`; no effect if the status has moved on (e.g. to `Stopping`).
    pub(crate) fn transition(&self, from: RunStatus, to: RunStatus) -> bool {
        self.status
            .compare_exchange(from.to_u8(), to.to_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Request stop. Idempotent; ignored once the run has finished.
    pub fn stop(&self) {
        if self.status().is_finished() {
            return;
        }
        if !self.stopped.swap(true, Ordering::AcqRel) {
            self.set_status(RunStatus::Stopping);
        }
        self.wake.notify_waiters();
    }

    /// Suspend while paused. Returns early when stop is requested; re-checks
    /// the flags at least every `poll`.
    pub(crate) async fn wait_while_paused(&self, poll: Duration) {
        while self.is_paused() && !self.is_stop_requested() {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_paused() || self.is_stop_requested() {
                break;
            }
            let _ = tokio::time::timeout(poll, notified).await;
        }
    }

    /// Resolves once stop has been requested.
    pub(crate) async fn stopped(&self) {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }
}

/// Default path for the control socket (XDG state dir).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("ytbatch")?.get_state_home();
    Ok(dir.join("control.sock"))
}
