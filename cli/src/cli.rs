use std::{net::SocketAddr, path::PathBuf};

/// Facility siting CLI
#[derive(clap::Parser, Debug)]
#[command(name = "facility-siting", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Rank candidate sites from a zipped or plain shapefile
    Rank(RankArgs),

    /// Serve the upload API over HTTP
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
pub struct RankArgs {
    /// Candidate sites, either a .zip archive or a .shp file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output GeoJSON file, defaults to "./top5.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Number of top sites to export
    #[arg(short = 'n', long)]
    pub top: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Listen address, overrides the configured one
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,
}
