//! Tests for the batch subcommands.

use super::parse;
use crate::cli::{BatchCommand, Cli, CliCommand};
use clap::Parser;
use std::path::Path;
use ytbatch_core::job::Quality;

#[test]
fn cli_parse_batch_run() {
    match parse(&["ytbatch", "batch", "run", "queue.json"]) {
        CliCommand::Batch(BatchCommand::Run {
            file,
            quality,
            no_archive,
        }) => {
            assert_eq!(file, Path::new("queue.json"));
            assert!(quality.is_none());
            assert!(!no_archive);
        }
        _ => panic!("expected Batch Run"),
    }
}

#[test]
fn cli_parse_batch_run_overrides() {
    match parse(&["ytbatch", "batch", "run", "q.json", "-q", "480p", "--no-archive"]) {
        CliCommand::Batch(BatchCommand::Run {
            quality, no_archive, ..
        }) => {
            assert_eq!(quality, Some(Quality::Max480));
            assert!(no_archive);
        }
        _ => panic!("expected Batch Run with overrides"),
    }
}

#[test]
fn cli_parse_batch_add() {
    match parse(&[
        "ytbatch",
        "batch",
        "add",
        "q.json",
        "https://youtube.com/@a",
        "/out/a",
        "--archive",
        "false",
    ]) {
        CliCommand::Batch(BatchCommand::Add {
            file,
            url,
            output,
            quality,
            archive,
        }) => {
            assert_eq!(file, Path::new("q.json"));
            assert_eq!(url, "https://youtube.com/@a");
            assert_eq!(output, Path::new("/out/a"));
            assert!(quality.is_none());
            assert_eq!(archive, Some(false));
        }
        _ => panic!("expected Batch Add"),
    }
}

#[test]
fn cli_parse_batch_add_requires_output() {
    assert!(Cli::try_parse_from(["ytbatch", "batch", "add", "q.json", "https://x"]).is_err());
}

#[test]
fn cli_parse_batch_remove() {
    match parse(&["ytbatch", "batch", "remove", "q.json", "3"]) {
        CliCommand::Batch(BatchCommand::Remove { file, position }) => {
            assert_eq!(file, Path::new("q.json"));
            assert_eq!(position, 3);
        }
        _ => panic!("expected Batch Remove"),
    }
}

#[test]
fn cli_parse_batch_clear_and_show() {
    match parse(&["ytbatch", "batch", "clear", "q.json"]) {
        CliCommand::Batch(BatchCommand::Clear { file }) => assert_eq!(file, Path::new("q.json")),
        _ => panic!("expected Batch Clear"),
    }
    match parse(&["ytbatch", "batch", "show", "q.json"]) {
        CliCommand::Batch(BatchCommand::Show { file }) => assert_eq!(file, Path::new("q.json")),
        _ => panic!("expected Batch Show"),
    }
}

#[test]
fn cli_parse_batch_requires_subcommand() {
    assert!(Cli::try_parse_from(["ytbatch", "batch"]).is_err());
}
