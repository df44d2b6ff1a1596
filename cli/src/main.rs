mod cli;
mod commands;
mod server;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{rank, serve};
use facility_siting::Config;

/// Log level from the `-v` count; `RUST_LOG` takes precedence when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn run() -> Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    match &cli.command {
        Commands::Rank(args) => rank::run(config, args),
        Commands::Serve(args) => serve::run(config, args),
    }
}

fn main() -> Result<()> { run() }
