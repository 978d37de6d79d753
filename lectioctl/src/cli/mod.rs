pub mod backfill;
pub mod chapter;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lectio_config::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lectioctl",
    version,
    about = "Inspect chapter watch gates and plan chapter backfills"
)]
pub struct Cli {
    /// Configuration file (TOML or JSON); overrides LECTIO_CONFIG_PATH
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Env file to load instead of ./.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chapter pages: load, complete and replay watch progress
    Chapter {
        #[command(subcommand)]
        action: chapter::ChapterAction,
    },
    /// Generate chapters for courses that only have one video
    Backfill {
        #[command(subcommand)]
        action: backfill::BackfillAction,
    },
}

pub async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Chapter { action } => chapter::run(action, &config).await,
        Command::Backfill { action } => backfill::run(action, &config).await,
    }
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
