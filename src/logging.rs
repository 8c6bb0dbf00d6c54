use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

const DEFAULT_FILTER: &str = "jeopardy_terminal=info";

/// Installs a file-backed subscriber when a log file is configured. Stdout
/// is owned by the terminal UI, so without one nothing is installed.
pub fn init_tracing(config: &AppConfig) -> Result<bool> {
    let Some(path) = config.log_file.as_ref() else {
        return Ok(false);
    };
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).context("create log directory")?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("tracing already initialised")?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(true)
}
