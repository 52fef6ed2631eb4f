use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::contract::ArchiveError;

/// A bucket directory that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDir {
    path: PathBuf,
    raw_data_dir: String,
}

impl BucketDir {
    /// The bucket path with any trailing separator removed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw_data_path(&self) -> PathBuf {
        self.path.join(&self.raw_data_dir)
    }
}

/// Checks that `bucket` is a directory holding the `raw_data_dir` subdirectory.
///
/// Performs no writes; a failure here leaves the bucket exactly as it was.
pub fn validate_bucket(bucket: &Path, raw_data_dir: &str) -> Result<BucketDir, ArchiveError> {
    if !bucket.is_dir() {
        error!(bucket = %bucket.display(), "Given bucket is not a valid directory");
        return Err(ArchiveError::NotADirectory(bucket.to_path_buf()));
    }

    // Rebuilding from components drops trailing separators and `.` segments.
    let path: PathBuf = bucket.components().collect();

    if !path.join(raw_data_dir).is_dir() {
        error!(
            bucket = %path.display(),
            raw_data_dir = raw_data_dir,
            "No raw data directory, given bucket is likely invalid"
        );
        return Err(ArchiveError::MissingRawData {
            bucket: path,
            raw_data_dir: raw_data_dir.to_string(),
        });
    }

    Ok(BucketDir {
        path,
        raw_data_dir: raw_data_dir.to_string(),
    })
}

/// Removes every top-level regular file of the bucket, keeping all subdirectories.
///
/// Index metadata and acceleration files are rebuilt from raw data on thaw, so only
/// directories are worth shipping. Returns the removed paths, sorted.
pub fn prune_metadata(bucket: &BucketDir) -> Result<Vec<PathBuf>, ArchiveError> {
    info!(bucket = %bucket.path().display(), "Archiving bucket");

    let entries = fs::read_dir(bucket.path()).map_err(|source| ArchiveError::Prune {
        path: bucket.path().to_path_buf(),
        source,
    })?;

    let mut removed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ArchiveError::Prune {
            path: bucket.path().to_path_buf(),
            source,
        })?;
        let path = entry.path();
        // Follows symlinks: a link to a file counts as a file, the link itself is removed.
        if !path.is_file() {
            debug!(path = %path.display(), "Keeping non-file entry");
            continue;
        }
        if let Err(source) = fs::remove_file(&path) {
            error!(error = ?source, path = %path.display(), "Failed to remove metadata file");
            return Err(ArchiveError::Prune { path, source });
        }
        debug!(path = %path.display(), "Removed metadata file");
        removed.push(path);
    }

    removed.sort();
    info!(
        bucket = %bucket.path().display(),
        removed = removed.len(),
        "Pruned bucket metadata"
    );
    Ok(removed)
}
