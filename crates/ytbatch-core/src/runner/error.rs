//! Errors raised by the batch runner.

use std::io;
use std::path::PathBuf;

use crate::job::JobOutcome;

/// Preconditions rejected synchronously by [`super::BatchRunner::start`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("a batch run is already active on this runner")]
    InvalidState,
    #[error("batch queue is empty")]
    EmptyQueue,
}

/// Failure of a single job. Never escapes the runner: each variant is turned
/// into a [`JobOutcome`] and the run moves on to the next job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("could not create output directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not launch {program}: {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("downloader {}", describe_exit(.code))]
    ProcessExit { code: Option<i32> },
    #[error("stopped by user")]
    StoppedByUser,
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exited with code {c}"),
        None => "was terminated by a signal".to_string(),
    }
}

impl JobError {
    pub fn outcome(&self) -> JobOutcome {
        match self {
            JobError::DirectoryCreation { .. } | JobError::ProcessLaunch { .. } => {
                JobOutcome::Failed(None)
            }
            JobError::ProcessExit { code } => JobOutcome::Failed(*code),
            JobError::StoppedByUser => JobOutcome::Stopped,
        }
    }
}
