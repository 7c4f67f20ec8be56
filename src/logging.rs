//! Tracing subscriber setup.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Build the event filter. `RUST_LOG` wins over the configured level.
pub fn filter(config: &LogConfig) -> Result<EnvFilter> {
  match std::env::var(EnvFilter::DEFAULT_ENV) {
    Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives),
    _ => EnvFilter::try_new(&config.level),
  }
  .map_err(|e| eyre!("Invalid log filter: {}", e))
}

/// Install the global subscriber.
///
/// Events go to stderr, or to `config.file` through a non-blocking writer.
/// Keep the returned guard alive for as long as file logging should flush.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
  let filter = filter(config)?;
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_thread_ids(false)
    .with_thread_names(false);

  match &config.file {
    Some(path) => {
      let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
      let name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;

      let appender = tracing_appender::rolling::never(dir, name);
      let (writer, guard) = tracing_appender::non_blocking(appender);
      builder
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;
      Ok(Some(guard))
    }
    None => {
      builder
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;
      Ok(None)
    }
  }
}
