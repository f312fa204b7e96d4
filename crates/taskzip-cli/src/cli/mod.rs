//! CLI for taskzip: bundle every attachment of an Asana project into one zip.

mod commands;
mod prompt;
mod reveal;
mod spinner;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use taskzip_core::config::{self, CollisionPolicy};

use commands::{run_archive, run_checksum, run_completions};

#[derive(Debug, Parser)]
#[command(name = "taskzip")]
#[command(about = "Download every attachment of an Asana project into one zip", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch all task attachments of a project and archive them.
    Run(RunArgs),

    /// Compute SHA-256 of a file (e.g. a produced archive).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Asana project ID (prompted for when omitted).
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,

    /// Asana personal access token (prompted for when omitted).
    #[arg(long, env = "ASANA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Folder the finished archive is moved into (default: Downloads).
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Concurrent attachment downloads.
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Concurrent catalog requests while resolving attachments.
    #[arg(long, value_name = "N")]
    pub catalog_jobs: Option<usize>,

    /// What to do when a task has two attachments with the same name.
    #[arg(long, value_enum)]
    pub collision: Option<CollisionArg>,

    /// Open the destination folder when done.
    #[arg(long)]
    pub reveal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollisionArg {
    /// Keep both, suffixing later copies with " (n)".
    Rename,
    /// Keep only the last one downloaded.
    Overwrite,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Rename => CollisionPolicy::Rename,
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run(args) => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_archive(&cfg, args).await?;
            }
            CliCommand::Checksum { path } => run_checksum(&path).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
