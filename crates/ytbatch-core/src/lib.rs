pub mod config;
pub mod logging;

pub mod batch_file;
pub mod control;
pub mod events;
pub mod job;
pub mod runner;
pub mod tool;
pub mod ytdlp;
