//! Index name derivation from a bucket's position on disk.
//!
//! Buckets live at `.../<index>/<db-parent>/<bucket-dir>`, so the index is the
//! bucket's grandparent directory.

use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::Regex;

use crate::contract::ArchiveError;

/// Parsed bucket directory name: `(db|rb)_<start>_<end>_<id>[_<guid>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketName {
    /// `true` for `rb_` buckets, copies replicated from another indexer.
    pub replicated: bool,
    pub start: u64,
    pub end: u64,
    pub local_id: u64,
    /// Originating indexer, present on clustered buckets.
    pub guid: Option<String>,
}

fn bucket_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(db|rb)_(\d+)_(\d+)_(\d+)(?:_([0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}))?$",
        )
        .expect("bucket name pattern is valid")
    })
}

impl BucketName {
    pub fn parse(name: &str) -> Option<Self> {
        let caps = bucket_name_pattern().captures(name)?;
        Some(BucketName {
            replicated: &caps[1] == "rb",
            start: caps[2].parse().ok()?,
            end: caps[3].parse().ok()?,
            local_id: caps[4].parse().ok()?,
            guid: caps.get(5).map(|m| m.as_str().to_string()),
        })
    }
}

/// Index name and bucket name extracted from a bucket path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketLocation {
    pub index_name: String,
    pub bucket_name: BucketName,
}

/// Derives the index name from `bucket`, rejecting paths that do not follow the
/// `.../<index>/<db-parent>/<bucket-dir>` layout. Trailing separators are ignored.
pub fn derive_index_name(bucket: &Path) -> Result<BucketLocation, ArchiveError> {
    let malformed = |reason: &str| ArchiveError::MalformedBucketPath {
        path: bucket.to_path_buf(),
        reason: reason.to_string(),
    };

    let mut tail = bucket.components().rev();
    let mut segments = Vec::with_capacity(3);
    for _ in 0..3 {
        match tail.next() {
            Some(Component::Normal(segment)) => segments.push(segment),
            Some(_) => return Err(malformed("expected named directories, found a special segment")),
            None => return Err(malformed("expected <index>/<db-parent>/<bucket-dir>")),
        }
    }

    let bucket_dir = segments[0]
        .to_str()
        .ok_or_else(|| malformed("bucket directory name is not valid UTF-8"))?;
    let bucket_name = BucketName::parse(bucket_dir)
        .ok_or_else(|| malformed("bucket directory is not named db_<start>_<end>_<id>"))?;

    let index_name = segments[2]
        .to_str()
        .ok_or_else(|| malformed("index name is not valid UTF-8"))?;

    Ok(BucketLocation {
        index_name: index_name.to_string(),
        bucket_name,
    })
}
