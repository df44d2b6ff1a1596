use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use facility_siting::{Config, Pipeline, ARTIFACT_NAME};

use crate::cli::RankArgs;

pub fn run(mut config: Config, args: &RankArgs) -> Result<()> {
    if let Some(top) = args.top {
        config.top_n = top;
    }
    let pipeline = Pipeline::from_config(&config);

    let is_zip = args.input.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    let geojson = if is_zip {
        let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
        pipeline.rank_archive(&args.input, scratch.path(), false)?
    } else {
        pipeline.rank_shapefile(&args.input)?
    };

    let output = args.output.clone().unwrap_or_else(|| PathBuf::from(ARTIFACT_NAME));
    fs::write(&output, geojson)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(path = %output.display(), "wrote ranked sites");

    Ok(())
}
