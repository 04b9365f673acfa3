//! File logging.
//!
//! The terminal belongs to the UI, so log lines go to
//! `<cache dir>/parley/parley.log` through a non-blocking writer. The filter
//! comes from `--log`, `PARLEY_LOG` or the config file, defaulting to `info`.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Install the subscriber. Keep the returned guard alive until exit so the
/// last lines get flushed.
pub fn init(filter: Option<&str>) -> Result<(WorkerGuard, PathBuf)> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, "parley.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    Ok((guard, log_dir.join("parley.log")))
}

fn log_dir() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("parley"))
}
