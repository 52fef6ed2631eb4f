#![cfg(unix)]

use std::fs::{create_dir_all, read_dir, read_to_string, set_permissions, write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use chrono::Local;
use serial_test::serial;
use tempfile::tempdir;

use frozen_archive::cli::{run, Cli};
use frozen_archive::logging::file_subscriber;
use frozen_archive_core::config::{ArchiveConfig, ToolConfig};

/// Stand-in for `gsutil cp` storing `gs://` objects under `store`.
fn fake_gsutil(dir: &Path, store: &Path, exit_code_for_tree: u8) -> PathBuf {
    let script = dir.join("gsutil");
    let body = format!(
        r#"#!/bin/sh
store="{store}"
[ "$1" = "-m" ] && shift
mode="$2"
src="$3"
dst="$store/${{4#gs://}}"
case "$mode" in
  -n)
    [ -e "$dst" ] && exit 0
    mkdir -p "$(dirname "$dst")" && cp "$src" "$dst"
    ;;
  -r)
    [ {code} -ne 0 ] && {{ echo "ServiceException: 503 backend unavailable" >&2; exit {code}; }}
    mkdir -p "$dst" && cp -R "$src" "$dst/"
    ;;
esac
"#,
        store = store.display(),
        code = exit_code_for_tree,
    );
    write(&script, body).unwrap();
    set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

struct Deployment {
    _tmp: tempfile::TempDir,
    bucket: PathBuf,
    store: PathBuf,
    config: ArchiveConfig,
}

fn deployment(exit_code_for_tree: u8) -> Deployment {
    let tmp = tempdir().unwrap();
    let bucket = tmp.path().join("splunk/web/colddb/db_1700000000_1690000000_17");
    create_dir_all(bucket.join("rawdata")).unwrap();
    write(bucket.join("rawdata/journal.gz"), b"raw events").unwrap();
    write(bucket.join("Hosts.data"), b"meta").unwrap();
    write(bucket.join("bloomfilter"), b"bloom").unwrap();

    let store = tmp.path().join("store");
    let markers = tmp.path().join("markers");
    create_dir_all(&store).unwrap();
    create_dir_all(&markers).unwrap();

    let config = ArchiveConfig {
        frozen_bucket: "acme-frozen".into(),
        log_location: tmp.path().join("frozen-archive.log"),
        marker_dir: markers,
        tool: ToolConfig {
            program: fake_gsutil(tmp.path(), &store, exit_code_for_tree),
            parallel: true,
        },
        ..ArchiveConfig::default()
    };
    Deployment {
        _tmp: tmp,
        bucket,
        store,
        config,
    }
}

#[tokio::test]
#[serial]
async fn archives_pruned_bucket_and_logs_completion() {
    let dep = deployment(0);
    let _guard = tracing::subscriber::set_default(file_subscriber(&dep.config).unwrap());

    let report = run(
        Cli {
            bucket: dep.bucket.clone(),
        },
        &dep.config,
    )
    .await
    .expect("Archive run should succeed");

    let today = Local::now().format("%Y-%m-%d").to_string();
    let remote_day = dep.store.join("acme-frozen/web").join(&today);
    assert_eq!(
        report.destination.as_str(),
        format!("gs://acme-frozen/web/{today}")
    );

    // Marker object and raw data arrived; metadata never left the host.
    assert!(remote_day.join("init").is_file());
    let remote_bucket = remote_day.join("db_1700000000_1690000000_17");
    assert_eq!(
        std::fs::read(remote_bucket.join("rawdata/journal.gz")).unwrap(),
        b"raw events"
    );
    let shipped: Vec<_> = read_dir(&remote_bucket)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(shipped, vec!["rawdata"]);

    let log = read_to_string(&dep.config.log_location).unwrap();
    assert!(log.contains("Archiving bucket"));
    assert!(log.contains("Folder created"));
    let completion = log
        .lines()
        .find(|l| l.contains("Completed copying"))
        .expect("Completion line is logged");
    assert!(completion.contains(&dep.bucket.display().to_string()));
}

#[tokio::test]
#[serial]
async fn failing_copy_tool_fails_the_run() {
    let dep = deployment(1);
    let _guard = tracing::subscriber::set_default(file_subscriber(&dep.config).unwrap());

    let err = run(
        Cli {
            bucket: dep.bucket.clone(),
        },
        &dep.config,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().starts_with("Failed to copy"), "got: {err}");
    assert!(err.to_string().contains("503"));
    let log = read_to_string(&dep.config.log_location).unwrap();
    assert!(!log.contains("Completed copying"));
    assert!(log.contains("Archiving failed"));
}

#[tokio::test]
#[serial]
async fn unconfigured_deployment_fails_before_touching_the_bucket() {
    let dep = deployment(0);
    let config = ArchiveConfig {
        frozen_bucket: String::new(),
        ..dep.config.clone()
    };

    let err = run(
        Cli {
            bucket: dep.bucket.clone(),
        },
        &config,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("frozen_bucket"));
    assert!(dep.bucket.join("Hosts.data").exists());
}
