//! `tiler-extensions` server: a tiler factory with the validation and STAC routes.

use clap::Parser;
use tiler_extensions::{Config, logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let _guard = logging::init(config.log_level.as_deref(), config.log_dir.as_deref())?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting tiler");
    server::serve(&config).await
}
