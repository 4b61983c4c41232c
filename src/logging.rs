//! File-backed tracing setup.
//!
//! The terminal is owned by the UI, so log output goes to `vidrec.log` in the
//! platform data dir (or the path given with `--log-file`).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::project_dirs;

const LOG_FILE_NAME: &str = "vidrec.log";

/// Default log file location, if the platform exposes a data dir.
pub fn default_log_path() -> Option<PathBuf> {
  project_dirs().map(|dirs| dirs.data_dir().join(LOG_FILE_NAME))
}

/// Build the filter: `RUST_LOG` wins, then the configured level, then `info`.
fn build_filter(level: Option<&str>) -> EnvFilter {
  EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(level.unwrap_or("info")))
    .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. The returned guard must be held until exit
/// so buffered lines are flushed.
pub fn init(path: &Path, level: Option<&str>) -> Result<WorkerGuard> {
  let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
  std::fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;
  let file_name = path.file_name().map_or_else(|| LOG_FILE_NAME.into(), |n| n.to_os_string());

  let appender = tracing_appender::rolling::never(dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(build_filter(level))
    .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(false))
    .try_init()
    .context("Failed to install tracing subscriber")?;

  Ok(guard)
}
