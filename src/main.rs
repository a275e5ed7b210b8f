mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::{run_match, run_query};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Match(args) => {
            run_match(args)?;
        }
        Commands::Query(args) => {
            run_query(args)?;
        }
    }

    Ok(())
}
