//! Job-count based progress for a batch run.
//!
//! Progress only counts whole jobs; sub-job item counts in the downloader's
//! output are not parsed.

/// Snapshot of how many jobs of a run have been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Jobs that have finished (any outcome).
    pub current: usize,
    /// Jobs in the run.
    pub total: usize,
}

impl BatchProgress {
    /// Whole percent complete, rounded down.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.current.min(self.total) * 100) / self.total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_down() {
        assert_eq!(BatchProgress { current: 0, total: 3 }.percent(), 0);
        assert_eq!(BatchProgress { current: 1, total: 3 }.percent(), 33);
        assert_eq!(BatchProgress { current: 2, total: 3 }.percent(), 66);
        assert_eq!(BatchProgress { current: 3, total: 3 }.percent(), 100);
    }

    #[test]
    fn empty_total_is_complete() {
        assert_eq!(BatchProgress { current: 0, total: 0 }.percent(), 100);
    }
}
