//! Tests for checksum, completions and the small helpers.

use super::parse;
use crate::cli::prompt::non_empty;
use crate::cli::reveal::reveal_command;
use crate::cli::spinner::spin;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;
use std::path::Path;
use taskzip_core::pipeline::RunSignal;

#[test]
fn cli_parse_checksum() {
    match parse(&["taskzip", "checksum", "/tmp/asana_files-2024-05-01.zip"]) {
        CliCommand::Checksum { path } => {
            assert_eq!(path, Path::new("/tmp/asana_files-2024-05-01.zip"))
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["taskzip", "completions", "zsh"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Zsh),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["taskzip"]).is_err());
}

#[test]
fn non_empty_trims_and_rejects_blank() {
    assert_eq!(non_empty("  1200\n", "project ID").unwrap(), "1200");
    let err = non_empty(" \n", "token").unwrap_err();
    assert_eq!(err.to_string(), "token cannot be empty");
}

#[cfg(all(unix, not(target_os = "macos")))]
#[test]
fn reveal_opens_containing_folder() {
    let cmd = reveal_command(Path::new("/home/me/Downloads/a.zip"));
    assert_eq!(cmd.get_program(), "xdg-open");
    let args: Vec<_> = cmd.get_args().collect();
    assert_eq!(args, vec![Path::new("/home/me/Downloads").as_os_str()]);
}

#[tokio::test]
async fn spinner_stops_on_finished() {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tx.send(RunSignal::Started).unwrap();
    tx.send(RunSignal::Finished).unwrap();
    spin(rx).await;
    // Sender still alive: returning proves Finished ended the loop.
    drop(tx);
}

#[tokio::test]
async fn spinner_stops_when_sender_dropped() {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<RunSignal>();
    let handle = tokio::spawn(spin(rx));
    tx.send(RunSignal::Started).unwrap();
    drop(tx);
    handle.await.unwrap();
}
