//! Terminal observer: prints downloader output and batch progress.

use ytbatch_core::events::BatchObserver;
use ytbatch_core::runner::BatchProgress;

#[derive(Debug, Default)]
pub struct ConsoleObserver {
    /// Print per-item progress lines (off for single downloads).
    pub show_progress: bool,
}

impl BatchObserver for ConsoleObserver {
    fn on_log(&mut self, line: &str) {
        println!("{line}");
    }

    fn on_progress(&mut self, progress: BatchProgress) {
        if self.show_progress {
            println!(
                "Processing: {} / {} items ({}%)",
                progress.current,
                progress.total,
                progress.percent()
            );
        }
    }

    fn on_item_status(&mut self, text: &str) {
        tracing::debug!("{}", text);
        if self.show_progress {
            println!("{text}");
        }
    }

    fn on_finished(&mut self, success: bool, summary: &str) {
        if success {
            println!("{summary}");
        } else {
            eprintln!("{summary}");
        }
    }
}
