use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

use crate::contract::{ArchiveError, RemotePath};

pub const DEFAULT_LOG_LOCATION: &str = "/opt/splunk/var/log/splunk/frozen-archive.log";

/// Deployment settings for a single archiving run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Cold storage bucket receiving frozen data.
    pub frozen_bucket: String,
    pub remote_scheme: String,
    pub log_level: String,
    pub log_location: PathBuf,
    /// Subdirectory every valid bucket carries; everything else is regenerated on thaw.
    pub raw_data_dir: String,
    /// Where the short-lived destination marker is written.
    pub marker_dir: PathBuf,
    pub tool: ToolConfig,
}

/// The external copy tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub program: PathBuf,
    /// Pass `-m` so the tool runs its own parallel transfer.
    pub parallel: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            frozen_bucket: String::new(),
            remote_scheme: "gs".to_string(),
            log_level: "INFO".to_string(),
            log_location: PathBuf::from(DEFAULT_LOG_LOCATION),
            raw_data_dir: "rawdata".to_string(),
            marker_dir: PathBuf::from("/tmp"),
            tool: ToolConfig::default(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gsutil"),
            parallel: true,
        }
    }
}

impl ArchiveConfig {
    pub fn trace_loaded(&self) {
        info!(
            frozen_bucket = %self.frozen_bucket,
            remote_root = %self.remote_root(),
            raw_data_dir = %self.raw_data_dir,
            tool = %self.tool.program.display(),
            parallel = self.tool.parallel,
            "Loaded archive config"
        );
        debug!(?self, "Archive config loaded (full debug)");
    }

    /// `<scheme>://<frozen_bucket>`, the root every index folder hangs off.
    pub fn remote_root(&self) -> RemotePath {
        RemotePath::bucket_root(&self.remote_scheme, &self.frozen_bucket)
    }

    /// Maps the configured level name onto a tracing filter.
    ///
    /// Accepts the tracing names plus `WARNING` and `CRITICAL`, case-insensitively.
    pub fn level_filter(&self) -> Result<LevelFilter, ArchiveError> {
        let level = self.log_level.trim().to_ascii_lowercase();
        let filter = match level.as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" | "warning" => LevelFilter::WARN,
            "error" | "critical" => LevelFilter::ERROR,
            "off" => LevelFilter::OFF,
            _ => {
                return Err(ArchiveError::Config(format!(
                    "unknown log_level {:?}",
                    self.log_level
                )))
            }
        };
        Ok(filter)
    }

    /// Checks every setting once, before anything touches the filesystem.
    pub fn validate(&self) -> Result<(), ArchiveError> {
        validate_bucket_name(&self.frozen_bucket)?;

        if self.remote_scheme.is_empty()
            || !self.remote_scheme.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ArchiveError::Config(format!(
                "remote_scheme {:?} must be non-empty ASCII alphanumerics",
                self.remote_scheme
            )));
        }

        self.level_filter()?;

        if self.log_location.as_os_str().is_empty() {
            return Err(ArchiveError::Config("log_location is empty".into()));
        }

        let mut raw = Path::new(&self.raw_data_dir).components();
        match (raw.next(), raw.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(ArchiveError::Config(format!(
                    "raw_data_dir {:?} must be a single directory name",
                    self.raw_data_dir
                )))
            }
        }

        if self.marker_dir.as_os_str().is_empty() {
            return Err(ArchiveError::Config("marker_dir is empty".into()));
        }
        if self.tool.program.as_os_str().is_empty() {
            return Err(ArchiveError::Config("tool.program is empty".into()));
        }
        Ok(())
    }
}

fn validate_bucket_name(name: &str) -> Result<(), ArchiveError> {
    if name.is_empty() {
        return Err(ArchiveError::Config("frozen_bucket is not configured".into()));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-".contains(c);
    if !(3..=63).contains(&name.len()) || !name.chars().all(allowed) {
        return Err(ArchiveError::Config(format!(
            "frozen_bucket {name:?} must be 3-63 characters of [a-z0-9._-]"
        )));
    }
    Ok(())
}
