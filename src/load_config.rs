//! `load_config` module: reads the deployment YAML into an [`ArchiveConfig`].
//!
//! The configuration is fixed at deployment time. The binary only ever looks at
//! [`DEFAULT_CONFIG_PATH`]; there are no flags or environment overrides, so the retention
//! hook's single argument stays the bucket path.
//!
//! # Errors
//! All errors use `anyhow::Error` and carry the config path. Validation of the loaded
//! values happens later, in `run`, through [`ArchiveConfig::validate`].

use anyhow::Result;
use frozen_archive_core::config::ArchiveConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "/opt/splunk/etc/frozen-archive.yaml";

/// Loads and parses a YAML config file. Missing keys take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ArchiveConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file means "all defaults".
    if config_content.trim().is_empty() {
        return Ok(ArchiveConfig::default());
    }

    match serde_yaml::from_str::<ArchiveConfig>(&config_content) {
        Ok(config) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!(
                "Failed to parse config YAML {:?}: {e}",
                path_ref
            ))
        }
    }
}

/// Like [`load_config`], but an absent file yields the built-in defaults.
pub fn load_deployment_config_from<P: AsRef<Path>>(path: P) -> Result<ArchiveConfig> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        info!(config_path = ?path_ref, "No config file, using built-in defaults");
        return Ok(ArchiveConfig::default());
    }
    load_config(path_ref)
}

/// Configuration to start a run with: the deployment config, or the defaults plus the
/// load error so it can be logged once logging is up.
pub fn load_startup_config<P: AsRef<Path>>(path: P) -> (ArchiveConfig, Option<anyhow::Error>) {
    match load_deployment_config_from(path) {
        Ok(config) => (config, None),
        Err(e) => (ArchiveConfig::default(), Some(e)),
    }
}
