//! This module implements the CLI interface for frozen-archive: argument parsing, the
//! usage error, and the [`main_with`] entrypoint the binary and integration tests share.
//!
//! All archiving logic lives in the [`frozen-archive-core`] crate; this module only wires
//! configuration, the `gsutil` transfer and the clock together.
//!
//! [`frozen-archive-core`]: ../../frozen-archive-core/

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use frozen_archive_core::archive::{archive_bucket, ArchiveReport};
use frozen_archive_core::config::ArchiveConfig;
use frozen_archive_core::transfer::GsutilTransfer;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::load_config::load_startup_config;
use crate::logging;

pub const USAGE: &str = "usage: frozen-archive <bucket_dir_to_archive>";

/// Exit status telling the retention policy it may delete the bucket.
pub const EXIT_ARCHIVED: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

/// CLI for frozen-archive: ship a frozen bucket to cold storage before deletion.
#[derive(Parser, Debug)]
#[clap(
    name = "frozen-archive",
    version,
    about = "Archive a frozen index bucket to cold cloud storage",
    override_usage = "frozen-archive <BUCKET>"
)]
pub struct Cli {
    /// Bucket directory handed over by the retention policy
    pub bucket: PathBuf,
}

/// Outcome of argument parsing.
#[derive(Debug)]
pub enum ParseOutcome {
    Run(Cli),
    /// `--help` or `--version`: print and exit successfully.
    Info(clap::Error),
    /// Wrong argument count or an unknown flag.
    Usage(clap::Error),
}

pub fn parse_args<I, T>(args: I) -> ParseOutcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => ParseOutcome::Run(cli),
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                ParseOutcome::Info(e)
            }
            _ => ParseOutcome::Usage(e),
        },
    }
}

/// Archives `cli.bucket` with the deployment `config`. Returns the report on success;
/// the caller must keep the local bucket on any error.
pub async fn run(cli: Cli, config: &ArchiveConfig) -> Result<ArchiveReport> {
    config.validate()?;
    config.trace_loaded();

    let transfer = GsutilTransfer::new(&config.tool);
    let report = archive_bucket(config, &transfer, &cli.bucket, &Local::now()).await?;

    tracing::info!(
        bucket = %report.bucket.display(),
        destination = %report.destination,
        pruned = report.pruned.len(),
        "Completed copying {} to cloud storage without errors",
        report.bucket.display()
    );
    Ok(report)
}

/// Full process lifecycle: load the config at `config_path`, start logging, parse `args`
/// and archive. Returns the exit status; anything but [`EXIT_ARCHIVED`] keeps the bucket.
pub async fn main_with<I, T>(config_path: &Path, args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let (config, config_error) = load_startup_config(config_path);
    let _log = logging::init(&config);

    if let Some(e) = config_error {
        tracing::error!(error = %e, "Could not load deployment configuration, bucket must be kept");
        eprintln!("{e}");
        return EXIT_FAILURE;
    }

    let cli = match parse_args(args) {
        ParseOutcome::Run(cli) => cli,
        ParseOutcome::Info(e) => {
            return match e.print() {
                Ok(()) => EXIT_ARCHIVED,
                Err(_) => EXIT_FAILURE,
            };
        }
        ParseOutcome::Usage(e) => {
            tracing::error!(kind = ?e.kind(), "{USAGE}");
            eprintln!("{USAGE}");
            return EXIT_USAGE;
        }
    };

    match run(cli, &config).await {
        Ok(_) => EXIT_ARCHIVED,
        Err(e) => {
            tracing::error!(error = %e, "Archive run failed, bucket must be kept");
            eprintln!("{e}");
            EXIT_FAILURE
        }
    }
}
