//! Tracing subscriber setup for the server binary.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "tiler_extensions.log";

/// Install the global subscriber.
///
/// `directive` wins over `RUST_LOG`; without either the filter is `info`. With a
/// `log_dir`, events are also written to a daily rolling file; keep the returned
/// guard alive until shutdown so buffered lines are flushed.
pub fn init(directive: Option<&str>, log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let stderr_layer = fmt::layer().with_target(false).compact().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
