//! Logging setup
//!
//! Console output plus a timestamped log file per run.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing; returns the log file path when one could be opened
pub fn init(verbose: bool, log_dir: &Path) -> Option<PathBuf> {
    let filter = if verbose {
        "dead_dl=debug,reqwest=debug"
    } else {
        "dead_dl=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let console = tracing_subscriber::fmt::layer().with_target(false);

    match open_log_file(log_dir) {
        Ok((path, file)) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
            Some(path)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console)
                .init();
            tracing::warn!("Logging to console only: {:#}", e);
            None
        }
    }
}

/// `{log_dir}/dead-dl_{YYYY-MM-DD_HH-MM-SS}.log`
pub fn log_file_name() -> String {
    format!("dead-dl_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S"))
}

fn open_log_file(log_dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create logs directory {}", log_dir.display()))?;

    let path = log_dir.join(log_file_name());
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok((path, file))
}
