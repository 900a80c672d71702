use std::io::Write;

use super::*;

#[test]
fn defaults_are_valid() {
    let config = RollConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.feed.window_days, 7);
    assert_eq!(config.feed.hydration_concurrency, 16);
    assert_eq!(config.uploads.concurrency, 4);
    assert_eq!(config.storage.backend, StorageBackend::Memory);
}

#[test]
fn builder_overrides_and_validates() {
    let config = ConfigBuilder::new()
        .with_feed_window_days(3)
        .with_upload_concurrency(8)
        .with_log_level(LogLevel::Debug)
        .build()
        .unwrap();

    assert_eq!(config.feed.window_days, 3);
    assert_eq!(config.uploads.concurrency, 8);
    assert_eq!(config.logging.level, LogLevel::Debug);

    let err = ConfigBuilder::new().with_feed_window_days(0).build();
    assert!(matches!(err, Err(ConfigError::ValidationError(_))));
}

#[test]
fn loader_layers_file_over_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[feed]\nwindow_days = 14\n\n[logging]\nlevel = \"warn\"\nformat = \"json\"\n"
    )
    .unwrap();

    let config = ConfigLoader::new().with_file(file.path()).load().unwrap();

    assert_eq!(config.feed.window_days, 14);
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Json);
    // Untouched sections keep their defaults.
    assert_eq!(config.uploads.concurrency, 4);
}

#[test]
fn loader_rejects_invalid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[uploads]\nconcurrency = 0\n").unwrap();

    let err = ConfigLoader::new().with_file(file.path()).load();
    assert!(matches!(err, Err(ConfigError::ValidationError(_))));
}
