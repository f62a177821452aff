// src/logging.rs
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{MonitorError, Result};

pub const LOG_FILE_NAME: &str = "gazette_monitor.log";
pub const DEFAULT_FILTER: &str = "gazette_monitor=info,warn";

/// Console (stderr) + `<log_dir>/gazette_monitor.log`.
/// Keep the returned guard alive until exit so the file writer flushes.
pub fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir).map_err(|e| MonitorError::io(log_dir, e))?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| MonitorError::Config(format!("tracing init: {e}")))?;

    Ok(guard)
}
