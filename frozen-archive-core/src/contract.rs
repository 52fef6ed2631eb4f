//! # contract: shared types and the transfer seam
//!
//! This module defines the [`Transferer`] trait, the object-store path type it works
//! with, and the error types every pipeline step returns.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so tests can script the copy tool without
//!   touching the network.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;

/// An object-store location such as `gs://frozen/main/2024-01-31`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath(String);

impl RemotePath {
    /// Root of a bucket, e.g. `gs://frozen`.
    pub fn bucket_root(scheme: &str, bucket: &str) -> Self {
        RemotePath(format!("{scheme}://{bucket}"))
    }

    /// Appends one segment, inserting exactly one `/` between the parts.
    pub fn join(&self, segment: &str) -> Self {
        let base = self.0.trim_end_matches('/');
        let segment = segment.trim_start_matches('/');
        RemotePath(format!("{base}/{segment}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure of a single copy tool invocation.
#[derive(Debug)]
pub enum TransferError {
    /// The tool process could not be started at all.
    Launch {
        program: String,
        source: std::io::Error,
    },
    /// The tool ran and reported failure through its exit status.
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Launch { program, source } => {
                write!(f, "could not launch {program}: {source}")
            }
            TransferError::Failed {
                command,
                code,
                stderr,
            } => {
                match code {
                    Some(code) => write!(f, "`{command}` exited with status {code}")?,
                    None => write!(f, "`{command}` was terminated by a signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Launch { source, .. } => Some(source),
            TransferError::Failed { .. } => None,
        }
    }
}

/// Trait for the cloud storage copy tool.
///
/// Implemented by [`crate::transfer::GsutilTransfer`] and by mocks in testing.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Transferer: Send + Sync {
    /// Copy a single local file to `remote`, leaving an existing object untouched.
    async fn copy_if_absent(&self, local: &Path, remote: &RemotePath)
        -> Result<(), TransferError>;

    /// Copy the directory tree at `local` into `remote`.
    async fn copy_tree(&self, local: &Path, remote: &RemotePath) -> Result<(), TransferError>;
}

/// Every way archiving a bucket can fail.
#[derive(Debug)]
pub enum ArchiveError {
    Config(String),
    NotADirectory(PathBuf),
    MissingRawData {
        bucket: PathBuf,
        raw_data_dir: String,
    },
    MalformedBucketPath {
        path: PathBuf,
        reason: String,
    },
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    Marker {
        dir: PathBuf,
        source: std::io::Error,
    },
    DestinationInit {
        destination: RemotePath,
        source: TransferError,
    },
    Copy {
        bucket: PathBuf,
        destination: RemotePath,
        source: TransferError,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Config(msg) => write!(f, "Invalid configuration: {msg}"),
            ArchiveError::NotADirectory(path) => {
                write!(f, "Given bucket is not a valid directory: {}", path.display())
            }
            ArchiveError::MissingRawData {
                bucket,
                raw_data_dir,
            } => write!(
                f,
                "No {raw_data_dir} directory, given bucket is likely invalid: {}",
                bucket.display()
            ),
            ArchiveError::MalformedBucketPath { path, reason } => {
                write!(f, "Malformed bucket path {}: {reason}", path.display())
            }
            ArchiveError::Prune { path, source } => {
                write!(f, "Failed to prune metadata at {}: {source}", path.display())
            }
            ArchiveError::Marker { dir, source } => write!(
                f,
                "Failed to write destination marker in {}: {source}",
                dir.display()
            ),
            ArchiveError::DestinationInit {
                destination,
                source,
            } => write!(
                f,
                "Failed to create the destination bucket {destination}: {source}"
            ),
            ArchiveError::Copy {
                bucket,
                destination,
                source,
            } => write!(
                f,
                "Failed to copy {} to {destination}: {source}",
                bucket.display()
            ),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Prune { source, .. } | ArchiveError::Marker { source, .. } => {
                Some(source)
            }
            ArchiveError::DestinationInit { source, .. } | ArchiveError::Copy { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
