use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use facility_siting::{Config, Pipeline};

use crate::{cli::ServeArgs, server};

pub fn run(mut config: Config, args: &ServeArgs) -> Result<()> {
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async {
        let pipeline = Arc::new(Pipeline::from_config(&config));
        let app = server::router(pipeline, config.server.max_upload_bytes);

        let listener = tokio::net::TcpListener::bind(config.server.listen).await
            .with_context(|| format!("Failed to bind {}", config.server.listen))?;
        info!("Starting server on {}", config.server.listen);

        axum::serve(listener, app).await?;
        Ok(())
    })
}
