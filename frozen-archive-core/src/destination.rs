use std::io::Write;
use std::path::Path;

use chrono::{DateTime, TimeZone};
use tempfile::NamedTempFile;
use tracing::{error, info};

use crate::config::ArchiveConfig;
use crate::contract::{ArchiveError, RemotePath, Transferer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";
/// Object written under every destination folder so the folder exists.
pub const MARKER_OBJECT: &str = "init";

/// `<remote_root>/<index_name>/<date>` for the given run time.
pub fn destination_for<Tz>(config: &ArchiveConfig, index_name: &str, now: &DateTime<Tz>) -> RemotePath
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    config
        .remote_root()
        .join(index_name)
        .join(&now.format(DATE_FORMAT).to_string())
}

/// Makes sure today's folder for `index_name` exists in cold storage.
///
/// Object stores have no directories, so a marker object is copied in with
/// no-clobber semantics; repeated runs on the same day keep the first marker.
pub async fn init_destination<T, Tz>(
    transfer: &T,
    config: &ArchiveConfig,
    index_name: &str,
    now: &DateTime<Tz>,
) -> Result<RemotePath, ArchiveError>
where
    T: Transferer + ?Sized,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let destination = destination_for(config, index_name, now);
    let stamp = now.format(TIMESTAMP_FORMAT).to_string();

    // Dropped (and deleted) once the copy has finished.
    let marker = write_marker(&config.marker_dir, &stamp)?;

    if let Err(source) = transfer
        .copy_if_absent(marker.path(), &destination.join(MARKER_OBJECT))
        .await
    {
        error!(destination = %destination, error = %source, "Failed to create the destination folder");
        return Err(ArchiveError::DestinationInit {
            destination,
            source,
        });
    }

    info!(destination = %destination, "Folder created");
    Ok(destination)
}

fn write_marker(dir: &Path, stamp: &str) -> Result<NamedTempFile, ArchiveError> {
    let marker_err = |source| ArchiveError::Marker {
        dir: dir.to_path_buf(),
        source,
    };
    let mut marker = tempfile::Builder::new()
        .prefix(&format!("init_{stamp}_"))
        .tempfile_in(dir)
        .map_err(marker_err)?;
    writeln!(marker, "{stamp}").map_err(marker_err)?;
    marker.flush().map_err(marker_err)?;
    Ok(marker)
}
