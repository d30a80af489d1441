use anyhow::Context;
use clap::Parser;
use trademem::cli::{pack, replay, unpack, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Replay(args) => replay::execute(args).context("replay failed"),
        Commands::Pack(args) => pack::execute(args).context("pack failed"),
        Commands::Unpack(args) => unpack::execute(args).context("unpack failed"),
    }
}
