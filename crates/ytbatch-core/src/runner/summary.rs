//! Final tally of a batch run.

use crate::job::JobOutcome;

/// Emitted exactly once per run, in [`crate::events::BatchEvent::RunFinished`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Per-job outcomes, in queue order.
    pub outcomes: Vec<JobOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    /// Jobs that did not complete: stopped mid-flight or never launched.
    pub not_processed: usize,
    pub total: usize,
    /// True when the run ended because of a stop request.
    pub stopped: bool,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: Vec<JobOutcome>, stopped: bool) -> Self {
        let total = outcomes.len();
        let succeeded = outcomes
            .iter()
            .filter(|o| **o == JobOutcome::Succeeded)
            .count();
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        Self {
            outcomes,
            succeeded,
            failed,
            not_processed: total - succeeded - failed,
            total,
            stopped,
        }
    }

    /// A run is successful when it ran to the end; individual failures are
    /// reported in the counts.
    pub fn success(&self) -> bool {
        !self.stopped
    }

    /// Jobs that were actually launched and reached an outcome.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn message(&self) -> String {
        if self.stopped {
            format!(
                "Batch stopped: {} successful, {} failed, {} not processed",
                self.succeeded, self.failed, self.not_processed
            )
        } else {
            format!(
                "Batch complete: {} successful, {} failed out of {} items",
                self.succeeded, self.failed, self.total
            )
        }
    }
}
