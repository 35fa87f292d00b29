//! Structured logging setup.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! application's call. This module offers a ready-made one:
//! - levels from TRACE to ERROR
//! - pretty, compact or JSON output
//! - `RUST_LOG` overrides the configured level
//!
//! Without `RUST_LOG` the filter covers both workspace crates at the configured
//! level, e.g. `coinbridge_core=info,coinbridge_exchanges=info`.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self as tracing_fmt, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use crate::error::Error;

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level: order-book writes and successful dispatches
    Trace,
    /// Debug level: skipped dispatches
    Debug,
    /// Info level: market table rebuilds
    Info,
    /// Warn level: provider bans, unrecognized order statuses
    Warn,
    /// Error level
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(Error::invalid_request(format!("unknown log level: {s}"))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// One line per event
    Compact,
    /// JSON lines for log shippers
    Json,
}

/// Log configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Whether to show timestamps
    pub show_time: bool,
    /// Whether to show thread IDs
    pub show_thread_ids: bool,
    /// Whether to show the target module
    pub show_target: bool,
    /// Whether to show span enter/close events
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_time: true,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Configuration for local development.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            show_span_events: true,
            ..Self::default()
        }
    }

    /// Configuration for production: JSON with thread ids.
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            show_thread_ids: true,
            ..Self::default()
        }
    }

    /// Configuration for tests: warnings only, compact, no timestamps.
    pub fn test() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            show_time: false,
            show_thread_ids: false,
            show_target: false,
            show_span_events: false,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> String {
        format!(
            "coinbridge_core={level},coinbridge_exchanges={level}",
            level = self.level
        )
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn build_layer(config: &LogConfig) -> BoxedLayer {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));
    let span_events = if config.show_span_events {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = tracing_fmt::layer()
        .with_thread_ids(config.show_thread_ids)
        .with_target(config.show_target)
        .with_span_events(span_events);

    let layer: BoxedLayer = match (config.format, config.show_time) {
        (LogFormat::Pretty, true) => base.pretty().boxed(),
        (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Json, true) => base.json().boxed(),
        (LogFormat::Json, false) => base.json().without_time().boxed(),
    };
    layer.with_filter(env_filter).boxed()
}

/// Installs the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_logging`] where that can happen.
///
/// # Examples
///
/// ```no_run
/// use coinbridge_core::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::production());
/// ```
pub fn init_logging(config: &LogConfig) {
    tracing_subscriber::registry()
        .with(build_layer(config))
        .init();
}

/// Installs the global subscriber unless one is already installed.
pub fn try_init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(build_layer(config))
        .try_init()
}
