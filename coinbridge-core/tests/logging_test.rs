//! Logging configuration tests.

use coinbridge_core::logging::{LogConfig, LogFormat, LogLevel, try_init_logging};
use std::sync::Once;

static INIT: Once = Once::new();

fn setup_logging(config: &LogConfig) {
    INIT.call_once(|| {
        let _ = try_init_logging(config);
    });
}

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(config.show_time);
}

#[test]
fn test_log_config_presets() {
    let development = LogConfig::development();
    assert_eq!(development.level, LogLevel::Debug);
    assert!(development.show_span_events);

    let production = LogConfig::production();
    assert_eq!(production.format, LogFormat::Json);
    assert!(production.show_thread_ids);

    let test = LogConfig::test();
    assert_eq!(test.level, LogLevel::Warn);
    assert_eq!(test.format, LogFormat::Compact);
    assert!(!test.show_time);
}

#[test]
fn test_default_directive_covers_both_crates() {
    let config = LogConfig {
        level: LogLevel::Trace,
        ..LogConfig::default()
    };
    assert_eq!(
        config.default_directive(),
        "coinbridge_core=trace,coinbridge_exchanges=trace"
    );
}

#[test]
fn test_log_level_parsing() {
    assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert_eq!(" debug ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    assert!("verbose".parse::<LogLevel>().is_err());
}

#[test]
fn test_log_config_from_json() {
    let config: LogConfig =
        serde_json::from_str(r#"{"level": "error", "format": "json"}"#).unwrap();
    assert_eq!(config.level, LogLevel::Error);
    assert_eq!(config.format, LogFormat::Json);
    assert!(config.show_time);
}

#[test]
fn test_second_init_is_an_error() {
    setup_logging(&LogConfig::test());
    assert!(try_init_logging(&LogConfig::test()).is_err());
}
