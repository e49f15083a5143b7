//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::config::{EnvReader, ServerConfig};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};

#[test]
fn test_global_init_happens_once() {
    // Only one global subscriber per process; this file owns it.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    // A bad filter is rejected before anything is installed
    assert!(init_logging(config.clone().with_filter("core_audio=loudest")).is_err());

    init_logging(config.clone()).unwrap();
    tracing::debug!(track_id = "t-42", "processed upload");

    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Failed to initialize logging"));
}

#[test]
fn test_logging_settings_from_env() {
    let env = EnvReader::from_pairs([
        ("RETUNE_DATABASE_PATH", "/tmp/library.db"),
        ("RETUNE_STORAGE_ROOT", "/tmp/objects"),
        ("RETUNE_LOG_FORMAT", "compact"),
        ("RETUNE_LOG_LEVEL", "warn"),
        ("RETUNE_LOG_FILTER", "core_audio=trace"),
    ]);

    let config = ServerConfig::from_env(&env).unwrap();
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.filter.as_deref(), Some("core_audio=trace"));
}

#[test]
fn test_redaction_of_sensitive_values() {
    assert_eq!(redact_if_sensitive("access_token", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("authorization", "Bearer x"), "[REDACTED]");

    // Owner ids that are email addresses keep only their first character
    let redacted = redact_if_sensitive("owner_id", "listener@example.com");
    assert!(redacted.starts_with('l'));
    assert!(!redacted.contains("example.com"));

    // Opaque ids pass through
    assert_eq!(redact_if_sensitive("owner_id", "user_123"), "user_123");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/var/lib/retune/objects/u/original/song.mp3"), "song.mp3");
    assert_eq!(strip_path("C:\\Users\\John\\Music\\song.mp3"), "song.mp3");
    assert_eq!(strip_path("song.mp3"), "song.mp3");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
