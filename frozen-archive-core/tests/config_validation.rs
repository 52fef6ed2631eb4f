use frozen_archive_core::config::ArchiveConfig;
use frozen_archive_core::contract::ArchiveError;
use tracing::level_filters::LevelFilter;

fn valid_config() -> ArchiveConfig {
    ArchiveConfig {
        frozen_bucket: "frozen-archive-prod".to_string(),
        ..ArchiveConfig::default()
    }
}

#[test]
fn test_defaults_require_a_frozen_bucket() {
    let err = ArchiveConfig::default().validate().unwrap_err();
    assert!(matches!(err, ArchiveError::Config(_)));
    assert!(err.to_string().contains("frozen_bucket"));
}

#[test]
fn test_valid_config_passes_and_builds_remote_root() {
    let config = valid_config();
    config.validate().expect("Config should be valid");
    assert_eq!(config.remote_root().as_str(), "gs://frozen-archive-prod");
}

#[test]
fn test_invalid_settings_are_rejected() {
    let cases: Vec<(&str, ArchiveConfig)> = vec![
        (
            "bucket with slash",
            ArchiveConfig {
                frozen_bucket: "frozen/sub".into(),
                ..valid_config()
            },
        ),
        (
            "bucket with scheme",
            ArchiveConfig {
                frozen_bucket: "gs://frozen".into(),
                ..valid_config()
            },
        ),
        (
            "bucket too short",
            ArchiveConfig {
                frozen_bucket: "ab".into(),
                ..valid_config()
            },
        ),
        (
            "empty scheme",
            ArchiveConfig {
                remote_scheme: String::new(),
                ..valid_config()
            },
        ),
        (
            "unknown level",
            ArchiveConfig {
                log_level: "LOUD".into(),
                ..valid_config()
            },
        ),
        (
            "nested raw data dir",
            ArchiveConfig {
                raw_data_dir: "raw/data".into(),
                ..valid_config()
            },
        ),
        (
            "parent raw data dir",
            ArchiveConfig {
                raw_data_dir: "..".into(),
                ..valid_config()
            },
        ),
    ];

    for (name, config) in cases {
        assert!(
            matches!(config.validate(), Err(ArchiveError::Config(_))),
            "{name}: should be rejected"
        );
    }
}

#[test]
fn test_level_filter_accepts_common_spellings() {
    let level = |name: &str| {
        ArchiveConfig {
            log_level: name.into(),
            ..valid_config()
        }
        .level_filter()
        .unwrap()
    };
    assert_eq!(level("INFO"), LevelFilter::INFO);
    assert_eq!(level("debug"), LevelFilter::DEBUG);
    assert_eq!(level("WARNING"), LevelFilter::WARN);
    assert_eq!(level("Critical"), LevelFilter::ERROR);
    assert_eq!(level("off"), LevelFilter::OFF);
}
