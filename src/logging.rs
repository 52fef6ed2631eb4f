//! File logging for the retention hook.
//!
//! Operators only see what lands in the log file, so every line carries a local
//! wall-clock timestamp and nothing else decorates it.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use frozen_archive_core::config::ArchiveConfig;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::ChronoLocal;

pub const LOG_TIME_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Builds a subscriber appending to `config.log_location`.
pub fn file_subscriber(config: &ArchiveConfig) -> Result<impl Subscriber + Send + Sync + 'static> {
    let level = config.level_filter()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_location)
        .with_context(|| format!("Failed to open log file {}", config.log_location.display()))?;

    Ok(tracing_subscriber::fmt()
        .with_max_level(level)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .finish())
}

/// Makes the file subscriber the default for the current thread until the guard drops.
/// Falls back to stderr when the log file cannot be opened so failures are never silent.
pub fn init(config: &ArchiveConfig) -> DefaultGuard {
    match file_subscriber(config) {
        Ok(subscriber) => tracing::subscriber::set_default(subscriber),
        Err(e) => {
            eprintln!("{e:#}; logging to stderr instead");
            let level = config.level_filter().unwrap_or(LevelFilter::INFO);
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
                .with_ansi(false)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }
    }
}
