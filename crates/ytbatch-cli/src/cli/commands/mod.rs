//! CLI command handlers, one file per command group.

mod batch;
mod completions;
mod control;
mod download;
mod run;
mod update;
mod version;

pub use batch::{run_batch_add, run_batch_clear, run_batch_file, run_batch_remove, run_batch_show};
pub use completions::run_completions;
pub use control::run_control;
pub use download::run_download;
pub use update::run_update;
pub use version::run_version;
