//! Server configuration from command line flags and `TILER_*` environment variables.

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_MAX_SOURCE_BYTES, DEFAULT_PREFIX};
use crate::factory::DatasetPathParams;
use crate::raster::source::SourceReader;

/// Command line and environment configuration of the tiler server
#[derive(Debug, Clone, Parser)]
#[command(name = "tiler-extensions", version, about = "COG validation and STAC item endpoints")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "TILER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "TILER_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Route prefix of the factory
    #[arg(long, env = "TILER_PREFIX", default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Resolve relative `url` values against this directory and refuse paths outside it
    #[arg(long, env = "TILER_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// Largest raster, in bytes, the bundled delegates will read
    #[arg(long, env = "TILER_MAX_SOURCE_BYTES", default_value_t = DEFAULT_MAX_SOURCE_BYTES)]
    pub max_source_bytes: u64,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, env = "TILER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log filter directive (overrides RUST_LOG)
    #[arg(long, env = "TILER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Do not register the `/validate` route
    #[arg(long)]
    pub disable_validate: bool,

    /// Do not register the `/stac` route
    #[arg(long)]
    pub disable_stac: bool,
}

impl Config {
    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Dataset dependency shared by every route of the factory
    pub fn path_dependency(&self) -> DatasetPathParams {
        self.data_root
            .as_ref()
            .map_or_else(DatasetPathParams::new, DatasetPathParams::with_root)
    }

    /// Source reader handed to the bundled delegates
    pub const fn source_reader(&self) -> SourceReader {
        SourceReader::new(self.max_source_bytes)
    }
}
