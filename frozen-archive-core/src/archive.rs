//! High-level pipeline: validate → prune → initialize destination → transfer.
//!
//! [`archive_bucket`] ships one frozen bucket to cold storage. It is fail-fast: the
//! first failing step returns its error and nothing is retried or rolled back.
//!
//! # Error Handling
//! Every step logs its own failure with the stage it happened in; callers surface the
//! returned [`ArchiveError`] to the operator and must keep the local bucket.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::{error, info};

use crate::bucket::{prune_metadata, validate_bucket};
use crate::config::ArchiveConfig;
use crate::contract::{ArchiveError, RemotePath, Transferer};
use crate::destination::init_destination;
use crate::index::{derive_index_name, BucketName};

/// Progress of a single run. Failures leave the machine wherever it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Validated,
    Pruned,
    DestinationReady,
    Transferred,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Validated => "validated",
            Stage::Pruned => "pruned",
            Stage::DestinationReady => "destination-ready",
            Stage::Transferred => "transferred",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub bucket: PathBuf,
    pub bucket_name: BucketName,
    pub index_name: String,
    pub destination: RemotePath,
    /// Metadata files removed before the copy.
    pub pruned: Vec<PathBuf>,
}

/// Archives the bucket at `bucket` according to `config`, using `now` for the dated
/// destination and the marker timestamp.
pub async fn archive_bucket<T, Tz>(
    config: &ArchiveConfig,
    transfer: &T,
    bucket: &Path,
    now: &DateTime<Tz>,
) -> Result<ArchiveReport, ArchiveError>
where
    T: Transferer + ?Sized,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut stage = Stage::Start;
    let fail = |stage: Stage, e: ArchiveError| {
        error!(stage = %stage, bucket = %bucket.display(), error = %e, "Archiving failed");
        e
    };

    let bucket_dir =
        validate_bucket(bucket, &config.raw_data_dir).map_err(|e| fail(stage, e))?;
    // Pure; done before pruning so a malformed path keeps its metadata.
    let location = derive_index_name(bucket_dir.path()).map_err(|e| fail(stage, e))?;
    stage = Stage::Validated;
    info!(
        stage = %stage,
        bucket = %bucket_dir.path().display(),
        index = %location.index_name,
        replicated = location.bucket_name.replicated,
        "Bucket validated"
    );

    let pruned = prune_metadata(&bucket_dir).map_err(|e| fail(stage, e))?;
    stage = Stage::Pruned;

    let destination = init_destination(transfer, config, &location.index_name, now)
        .await
        .map_err(|e| fail(stage, e))?;
    stage = Stage::DestinationReady;

    if let Err(source) = transfer.copy_tree(bucket_dir.path(), &destination).await {
        return Err(fail(
            stage,
            ArchiveError::Copy {
                bucket: bucket_dir.path().to_path_buf(),
                destination,
                source,
            },
        ));
    }
    stage = Stage::Transferred;
    info!(
        stage = %stage,
        bucket = %bucket_dir.path().display(),
        destination = %destination,
        "Success: bucket copied to cloud storage"
    );

    info!(stage = %Stage::Done, bucket = %bucket_dir.path().display(), "Archive run finished");
    Ok(ArchiveReport {
        bucket: bucket_dir.path().to_path_buf(),
        bucket_name: location.bucket_name,
        index_name: location.index_name,
        destination,
        pruned,
    })
}
