//! Command-line interface definitions.

pub mod output;
pub mod pack;
pub mod replay;
pub mod unpack;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;

/// Trademem - shared trade memory with expert routing.
#[derive(Parser, Debug)]
#[command(name = "trademem")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a JSON-lines event file and run queries against it
    Replay(ReplayArgs),

    /// Encode JSON-lines trades into wire frames
    Pack(PackArgs),

    /// Decode wire frames into JSON-lines trades
    Unpack(UnpackArgs),
}

/// Shared argument for commands that read a config file.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ConfigPathArg {
    /// Load the configured file, or defaults, and install logging.
    pub fn load(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        config.logging.init();
        Ok(config)
    }
}

/// Arguments for the `replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub config: ConfigPathArg,

    /// JSON-lines file of `{"kind": "trade" | "regime" | "decision", ...}` events
    pub events: PathBuf,

    /// Query to run after ingestion, as a JSON object (repeatable)
    #[arg(short, long = "query")]
    pub queries: Vec<String>,

    /// Override the number of experts consulted per query
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Print results and stats as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `pack` subcommand.
#[derive(Parser, Debug)]
pub struct PackArgs {
    #[command(flatten)]
    pub config: ConfigPathArg,

    /// JSON-lines file of trade payloads
    pub trades: PathBuf,

    /// Output file for the wire frames
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the `unpack` subcommand.
#[derive(Parser, Debug)]
pub struct UnpackArgs {
    #[command(flatten)]
    pub config: ConfigPathArg,

    /// File of back-to-back wire frames
    pub input: PathBuf,
}

/// Non-empty lines of a JSON-lines file with their 1-based line numbers.
pub(crate) fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line.to_string()))
        .collect())
}
